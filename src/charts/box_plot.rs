use super::prepare::{BoxPanel, BoxPlotData};
use super::{ensure_parent, padded_range, ChartOptions, RenderError, RenderResult};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::error::Error;
use std::path::Path;

const CHART: &str = "box_plot";

/// One panel per prepared distribution, side by side.
pub fn render_box(path: &Path, data: &BoxPlotData, options: &ChartOptions) -> RenderResult<()> {
    if data.is_empty() {
        return Err(RenderError::EmptySeries {
            chart: CHART,
            reason: "no division has any values".to_string(),
        });
    }

    ensure_parent(path)?;
    let root = BitMapBackend::new(path, options.resolution).into_drawing_area();
    draw_box(&root, data, options).map_err(|e| RenderError::drawing(CHART, e))
}

fn draw_box<DB>(
    root: &DrawingArea<DB, Shift>,
    data: &BoxPlotData,
    options: &ChartOptions,
) -> Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let titled = root.titled(&options.title, ("sans-serif", 28))?;

    let panels: Vec<&BoxPanel> = data.panels.iter().filter(|p| !p.groups.is_empty()).collect();
    let areas = titled.split_evenly((1, panels.len()));

    for (area, panel) in areas.iter().zip(panels) {
        draw_panel(area, panel, options)?;
    }

    root.present()?;
    Ok(())
}

fn draw_panel<DB>(
    area: &DrawingArea<DB, Shift>,
    panel: &BoxPanel,
    options: &ChartOptions,
) -> Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let labels: Vec<String> = panel.groups.iter().map(|g| g.label.clone()).collect();
    let (lo, hi) = panel.value_range();
    let (y_min, y_max) = padded_range(lo, hi, 0.08);
    // Boxplot positions its elements in f32.
    let (y_min, y_max) = (y_min as f32, y_max as f32);

    let mut chart = ChartBuilder::on(area)
        .caption(&panel.title, ("sans-serif", 20))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d(labels[..].into_segmented(), y_min..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(options.x_label.as_str())
        .y_desc(panel.y_label.as_str())
        .x_labels(labels.len())
        .x_label_formatter(&|v| match v {
            SegmentValue::Exact(label) | SegmentValue::CenterOf(label) => label.to_string(),
            SegmentValue::Last => String::new(),
        })
        .y_label_formatter(&|v| format!("{:.0}", v))
        .draw()?;

    let group_count = panel.groups.len();
    for (i, group) in panel.groups.iter().enumerate() {
        let quartiles = Quartiles::new(&group.values);
        let color = options.color_scheme.color(i, group_count);
        chart.draw_series(vec![
            Boxplot::new_vertical(SegmentValue::CenterOf(&labels[i]), &quartiles)
                .width(30)
                .whisker_width(0.5)
                .style(color.mix(0.9).stroke_width(2)),
        ])?;
    }

    Ok(())
}

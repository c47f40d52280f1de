use super::prepare::ScatterData;
use super::{ensure_parent, padded_range, ChartOptions, RenderError, RenderResult};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::error::Error;
use std::path::Path;

const CHART: &str = "scatter_plot";

pub fn render_scatter(path: &Path, data: &ScatterData, options: &ChartOptions) -> RenderResult<()> {
    if data.is_empty() {
        return Err(RenderError::EmptySeries {
            chart: CHART,
            reason: "no district has a defined gender ratio".to_string(),
        });
    }

    ensure_parent(path)?;
    let root = BitMapBackend::new(path, options.resolution).into_drawing_area();
    draw_scatter(&root, data, options).map_err(|e| RenderError::drawing(CHART, e))
}

fn draw_scatter<DB>(
    root: &DrawingArea<DB, Shift>,
    data: &ScatterData,
    options: &ChartOptions,
) -> Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let (x_min, x_max) = padded_range(data.x_range.0, data.x_range.1, 0.05);
    let (y_min, y_max) = padded_range(data.y_range.0, data.y_range.1, 0.08);

    let mut chart = ChartBuilder::on(root)
        .caption(&options.title, ("sans-serif", 28))
        .margin(25)
        .x_label_area_size(55)
        .y_label_area_size(80)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc(options.x_label.as_str())
        .y_desc(options.y_label.as_str())
        .x_label_formatter(&|v| format!("{:.0}", v))
        .y_label_formatter(&|v| format!("{:.0}", v))
        .draw()?;

    let group_count = data.groups.len();
    for (i, group) in data.groups.iter().enumerate() {
        let color = options.color_scheme.color(i, group_count);
        chart
            .draw_series(
                group
                    .points
                    .iter()
                    .map(move |&(x, y)| Circle::new((x, y), 6, color.mix(0.7).filled())),
            )?
            .label(group.label.as_str())
            .legend(move |(x, y)| Circle::new((x, y), 5, color.filled()));
    }

    if let Some(fit) = data.trend {
        chart
            .draw_series(LineSeries::new(
                vec![(x_min, fit.at(x_min)), (x_max, fit.at(x_max))],
                RED.stroke_width(2),
            ))?
            .label(format!("Trend line (slope: {:.4})", fit.slope))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));
    }

    if options.annotate_outliers {
        chart.draw_series(data.annotations.iter().map(|a| {
            EmptyElement::at((a.x, a.y))
                + Circle::new((0, 0), 9, BLACK.stroke_width(1))
                + Text::new(a.label.clone(), (10, -18), ("sans-serif", 14).into_font())
        }))?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.85))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::prepare_scatter;

    #[test]
    fn empty_series_is_refused() {
        let data = prepare_scatter(&[], &[]);
        let path = std::env::temp_dir().join("voter_stats_empty_scatter.png");
        let result = render_scatter(&path, &data, &ChartOptions::scatter_defaults());
        assert!(matches!(result, Err(RenderError::EmptySeries { .. })));
    }
}

use super::prepare::{BarChartData, GroupedBar};
use super::{ensure_parent, format_count, ChartOptions, RenderError, RenderResult};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::error::Error;
use std::path::Path;

const CHART: &str = "bar_plot";

const MALE_COLOR: RGBColor = RGBColor(173, 216, 230);
const FEMALE_COLOR: RGBColor = RGBColor(255, 182, 193);

/// Top districts on top, division male/female comparison below.
pub fn render_bar(path: &Path, data: &BarChartData, options: &ChartOptions) -> RenderResult<()> {
    if data.is_empty() {
        return Err(RenderError::EmptySeries {
            chart: CHART,
            reason: "no districts to rank".to_string(),
        });
    }

    ensure_parent(path)?;
    let root = BitMapBackend::new(path, options.resolution).into_drawing_area();
    draw_bar(&root, data, options).map_err(|e| RenderError::drawing(CHART, e))
}

fn segment_label(labels: &[String], value: &SegmentValue<u32>) -> String {
    match value {
        SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
        _ => String::new(),
    }
}

fn draw_bar<DB>(
    root: &DrawingArea<DB, Shift>,
    data: &BarChartData,
    options: &ChartOptions,
) -> Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let titled = root.titled(&options.title, ("sans-serif", 28))?;
    let areas = titled.split_evenly((2, 1));

    if !data.top.is_empty() {
        draw_top_districts(&areas[0], data, options)?;
    }
    if !data.divisions.is_empty() {
        draw_divisions(&areas[1], &data.divisions, options)?;
    }

    root.present()?;
    Ok(())
}

fn draw_top_districts<DB>(
    area: &DrawingArea<DB, Shift>,
    data: &BarChartData,
    options: &ChartOptions,
) -> Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let labels: Vec<String> = data.top.iter().map(|b| b.label.clone()).collect();
    let count = data.top.len() as u32;
    let y_max = data.top.iter().map(|b| b.value).fold(1.0, f64::max) * 1.15;

    let mut chart = ChartBuilder::on(area)
        .caption(&data.top_title, ("sans-serif", 20))
        .margin(20)
        .x_label_area_size(120)
        .y_label_area_size(90)
        .build_cartesian_2d((0u32..count).into_segmented(), 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(options.x_label.as_str())
        .y_desc(options.y_label.as_str())
        .x_labels(labels.len())
        .x_label_formatter(&|v| segment_label(&labels, v))
        .x_label_style(
            ("sans-serif", 12)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .y_label_formatter(&|v| format_count(*v))
        .draw()?;

    let len = data.top.len();
    chart.draw_series(data.top.iter().enumerate().map(|(i, bar)| {
        let i = i as u32;
        let mut rect = Rectangle::new(
            [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), bar.value)],
            options.color_scheme.color(i as usize, len).filled(),
        );
        rect.set_margin(0, 0, 6, 6);
        rect
    }))?;

    if options.annotate_outliers {
        chart.draw_series(data.top.iter().enumerate().filter(|(_, b)| b.outlier).map(
            |(i, bar)| {
                let i = i as u32;
                let mut rect = Rectangle::new(
                    [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), bar.value)],
                    RED.stroke_width(3),
                );
                rect.set_margin(0, 0, 6, 6);
                rect
            },
        ))?;

        chart.draw_series(data.top.iter().enumerate().map(|(i, bar)| {
            EmptyElement::at((SegmentValue::CenterOf(i as u32), bar.value))
                + Text::new(bar.value_label.clone(), (-24, -16), ("sans-serif", 12).into_font())
        }))?;
    }

    Ok(())
}

fn draw_divisions<DB>(
    area: &DrawingArea<DB, Shift>,
    divisions: &[GroupedBar],
    options: &ChartOptions,
) -> Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let labels: Vec<String> = divisions.iter().map(|d| d.label.clone()).collect();
    let count = divisions.len() as u32;
    let y_max = divisions
        .iter()
        .map(|d| d.male.max(d.female))
        .fold(1.0, f64::max)
        * 1.1;

    let mut chart = ChartBuilder::on(area)
        .caption("Division-wise Male vs Female Registration", ("sans-serif", 20))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(90)
        .build_cartesian_2d((0u32..count).into_segmented(), 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Division")
        .y_desc("Registration Count")
        .x_labels(labels.len())
        .x_label_formatter(&|v| segment_label(&labels, v))
        .y_label_formatter(&|v| format_count(*v))
        .draw()?;

    chart
        .draw_series(divisions.iter().enumerate().map(|(i, d)| {
            let i = i as u32;
            let mut rect = Rectangle::new(
                [(SegmentValue::Exact(i), 0.0), (SegmentValue::CenterOf(i), d.male)],
                MALE_COLOR.mix(0.9).filled(),
            );
            rect.set_margin(0, 0, 8, 1);
            rect
        }))?
        .label("Male")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], MALE_COLOR.filled()));

    chart
        .draw_series(divisions.iter().enumerate().map(|(i, d)| {
            let i = i as u32;
            let mut rect = Rectangle::new(
                [(SegmentValue::CenterOf(i), 0.0), (SegmentValue::Exact(i + 1), d.female)],
                FEMALE_COLOR.mix(0.9).filled(),
            );
            rect.set_margin(0, 0, 1, 8);
            rect
        }))?
        .label("Female")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], FEMALE_COLOR.filled()));

    if options.annotate_outliers {
        chart.draw_series(divisions.iter().enumerate().map(|(i, d)| {
            EmptyElement::at((SegmentValue::CenterOf(i as u32), d.male.max(d.female)))
                + Text::new(
                    format_count(d.male + d.female),
                    (-24, -16),
                    ("sans-serif", 12).into_font(),
                )
        }))?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.85))
        .border_style(&BLACK)
        .draw()?;

    Ok(())
}

pub mod bar;
pub mod box_plot;
pub mod prepare;
pub mod scatter;

use itertools::Itertools;
use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use bar::render_bar;
pub use box_plot::render_box;
pub use prepare::{prepare_bar, prepare_box, prepare_scatter, BarChartData, BoxPlotData, ScatterData};
pub use scatter::render_scatter;

pub const SCATTER_FILE: &str = "scatter_plot.png";
pub const BOX_FILE: &str = "box_plot.png";
pub const BAR_FILE: &str = "bar_plot.png";

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("nothing to plot in {chart}: {reason}")]
    EmptySeries { chart: &'static str, reason: String },
    #[error("failed to draw {chart}: {message}")]
    Drawing { chart: &'static str, message: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    fn drawing(chart: &'static str, e: Box<dyn std::error::Error>) -> Self {
        RenderError::Drawing {
            chart,
            message: e.to_string(),
        }
    }
}

pub type RenderResult<T> = std::result::Result<T, RenderError>;

/// The bitmap backend only reports a missing directory when the image is
/// flushed, so create it up front.
fn ensure_parent(path: &Path) -> RenderResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScheme {
    Tab10,
    Set3,
    Viridis,
    Pastel,
}

const TAB10: [(u8, u8, u8); 10] = [
    (31, 119, 180),
    (255, 127, 14),
    (44, 160, 44),
    (214, 39, 40),
    (148, 103, 189),
    (140, 86, 75),
    (227, 119, 194),
    (127, 127, 127),
    (188, 189, 34),
    (23, 190, 207),
];

const SET3: [(u8, u8, u8); 12] = [
    (141, 211, 199),
    (255, 255, 179),
    (190, 186, 218),
    (251, 128, 114),
    (128, 177, 211),
    (253, 180, 98),
    (179, 222, 105),
    (252, 205, 229),
    (217, 217, 217),
    (188, 128, 189),
    (204, 235, 197),
    (255, 237, 111),
];

const VIRIDIS: [(u8, u8, u8); 10] = [
    (68, 1, 84),
    (72, 40, 120),
    (62, 74, 137),
    (49, 104, 142),
    (38, 130, 142),
    (31, 158, 137),
    (53, 183, 121),
    (109, 205, 89),
    (180, 222, 44),
    (253, 231, 37),
];

const PASTEL: [(u8, u8, u8); 6] = [
    (173, 216, 230),
    (255, 182, 193),
    (152, 251, 152),
    (255, 218, 185),
    (221, 160, 221),
    (176, 224, 230),
];

impl ColorScheme {
    /// Color for item `index` of `count`. Categorical schemes cycle; viridis
    /// spreads the items evenly along the gradient.
    pub fn color(&self, index: usize, count: usize) -> RGBColor {
        let (r, g, b) = match self {
            ColorScheme::Tab10 => TAB10[index % TAB10.len()],
            ColorScheme::Set3 => SET3[index % SET3.len()],
            ColorScheme::Pastel => PASTEL[index % PASTEL.len()],
            ColorScheme::Viridis => {
                let t = if count <= 1 {
                    0.0
                } else {
                    (index.min(count - 1)) as f64 / (count - 1) as f64
                };
                gradient(&VIRIDIS, t)
            }
        };
        RGBColor(r, g, b)
    }
}

fn gradient(stops: &[(u8, u8, u8)], t: f64) -> (u8, u8, u8) {
    let pos = t.clamp(0.0, 1.0) * (stops.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(stops.len() - 1);
    let frac = pos - lo as f64;
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    (
        mix(stops[lo].0, stops[hi].0),
        mix(stops[lo].1, stops[hi].1),
        mix(stops[lo].2, stops[hi].2),
    )
}

/// Options handed to each renderer alongside its prepared series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartOptions {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub color_scheme: ColorScheme,
    /// Width and height in pixels.
    pub resolution: (u32, u32),
    pub annotate_outliers: bool,
}

impl ChartOptions {
    pub fn scatter_defaults() -> Self {
        Self {
            title: "District-wise Gender Ratio vs Registration Volume".to_string(),
            x_label: "Active Registration".to_string(),
            y_label: "Gender Ratio (Females per 1000 Males)".to_string(),
            color_scheme: ColorScheme::Tab10,
            resolution: (1400, 1000),
            annotate_outliers: true,
        }
    }

    pub fn box_defaults() -> Self {
        Self {
            title: "Registration and Gender Ratio by Division".to_string(),
            x_label: "Division".to_string(),
            y_label: String::new(),
            color_scheme: ColorScheme::Set3,
            resolution: (1600, 800),
            annotate_outliers: false,
        }
    }

    pub fn bar_defaults() -> Self {
        Self {
            title: "Top Districts and Division Comparison".to_string(),
            x_label: "District".to_string(),
            y_label: "Active Registration".to_string(),
            color_scheme: ColorScheme::Viridis,
            resolution: (1600, 1200),
            annotate_outliers: true,
        }
    }
}

/// `1234567.0` -> `"1,234,567"`.
pub fn format_count(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let grouped = digits
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .join(",");
    if rounded < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Axis range with some headroom. Degenerate ranges are widened.
pub(crate) fn padded_range(min: f64, max: f64, pad: f64) -> (f64, f64) {
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let span = max - min;
    if span <= 0.0 {
        let half = if min == 0.0 { 1.0 } else { min.abs() * 0.1 };
        return (min - half, max + half);
    }
    (min - span * pad, max + span * pad)
}

use crate::analysis::DEFAULT_OUTLIER_THRESHOLD;
use crate::charts::{ChartOptions, ColorScheme};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_INPUT: &str = "data.csv";
pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Partial chart options; unset fields keep the chart's defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartOverrides {
    pub title: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub color_scheme: Option<ColorScheme>,
    pub resolution: Option<(u32, u32)>,
    pub annotate_outliers: Option<bool>,
}

impl ChartOverrides {
    pub fn apply(&self, mut options: ChartOptions) -> ChartOptions {
        if let Some(title) = &self.title {
            options.title = title.clone();
        }
        if let Some(x_label) = &self.x_label {
            options.x_label = x_label.clone();
        }
        if let Some(y_label) = &self.y_label {
            options.y_label = y_label.clone();
        }
        if let Some(scheme) = self.color_scheme {
            options.color_scheme = scheme;
        }
        if let Some(resolution) = self.resolution {
            options.resolution = resolution;
        }
        if let Some(annotate) = self.annotate_outliers {
            options.annotate_outliers = annotate;
        }
        options
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartsConfig {
    pub scatter: ChartOverrides,
    #[serde(rename = "box")]
    pub box_plot: ChartOverrides,
    pub bar: ChartOverrides,
}

/// Contents of the optional JSON config file. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub input: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub top_n: Option<usize>,
    pub outlier_threshold: Option<f64>,
    pub charts: ChartsConfig,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Values given on the command line; these win over the config file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub input: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub top_n: Option<usize>,
    pub outlier_threshold: Option<f64>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub top_n: usize,
    pub outlier_threshold: f64,
    pub scatter: ChartOptions,
    pub box_plot: ChartOptions,
    pub bar: ChartOptions,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output_dir: PathBuf::from("."),
            top_n: DEFAULT_TOP_N,
            outlier_threshold: DEFAULT_OUTLIER_THRESHOLD,
            scatter: ChartOptions::scatter_defaults(),
            box_plot: ChartOptions::box_defaults(),
            bar: ChartOptions::bar_defaults(),
        }
    }
}

impl AnalysisConfig {
    /// CLI flag > config file > built-in default.
    pub fn resolve(file: Option<FileConfig>, cli: CliOverrides) -> Self {
        let defaults = AnalysisConfig::default();
        let file = file.unwrap_or_default();

        AnalysisConfig {
            input: cli.input.or(file.input).unwrap_or(defaults.input),
            output_dir: cli.output_dir.or(file.output_dir).unwrap_or(defaults.output_dir),
            top_n: cli.top_n.or(file.top_n).unwrap_or(defaults.top_n),
            outlier_threshold: cli
                .outlier_threshold
                .or(file.outlier_threshold)
                .unwrap_or(defaults.outlier_threshold),
            scatter: file.charts.scatter.apply(defaults.scatter),
            box_plot: file.charts.box_plot.apply(defaults.box_plot),
            bar: file.charts.bar.apply(defaults.bar),
        }
    }
}

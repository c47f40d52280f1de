//! Plain-data series for the renderers. Nothing here touches plotters.

use super::format_count;
use crate::analysis::{linear_fit, DivisionAggregate, LinearFit};
use crate::model::DerivedRecord;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterGroup {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub label: String,
    pub x: f64,
    pub y: f64,
}

/// Gender ratio (y) against active registrations (x), one group per division.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterData {
    pub groups: Vec<ScatterGroup>,
    pub trend: Option<LinearFit>,
    pub annotations: Vec<Annotation>,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
}

impl ScatterData {
    pub fn point_count(&self) -> usize {
        self.groups.iter().map(|g| g.points.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.point_count() == 0
    }
}

pub fn prepare_scatter(derived: &[DerivedRecord], outliers: &[&DerivedRecord]) -> ScatterData {
    let mut groups: Vec<ScatterGroup> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut all_points = Vec::new();

    for d in derived {
        let ratio = match d.metrics.gender_ratio {
            Some(ratio) => ratio,
            None => continue,
        };
        let point = (d.record.active_registrations as f64, ratio);

        let slot = *index.entry(d.record.division.as_str()).or_insert_with(|| {
            groups.push(ScatterGroup {
                label: d.record.division.clone(),
                points: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].points.push(point);
        all_points.push(point);
    }

    let annotations = outliers
        .iter()
        .filter_map(|d| {
            d.metrics.gender_ratio.map(|ratio| Annotation {
                label: format!("{} ({:.0})", d.record.district, ratio),
                x: d.record.active_registrations as f64,
                y: ratio,
            })
        })
        .collect();

    ScatterData {
        trend: linear_fit(&all_points),
        x_range: bounds(all_points.iter().map(|(x, _)| *x)),
        y_range: bounds(all_points.iter().map(|(_, y)| *y)),
        groups,
        annotations,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxGroup {
    pub label: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxPanel {
    pub title: String,
    pub y_label: String,
    pub groups: Vec<BoxGroup>,
}

impl BoxPanel {
    pub fn value_range(&self) -> (f64, f64) {
        bounds(self.groups.iter().flat_map(|g| g.values.iter().copied()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxPlotData {
    pub panels: Vec<BoxPanel>,
}

impl BoxPlotData {
    pub fn is_empty(&self) -> bool {
        self.panels.iter().all(|p| p.groups.is_empty())
    }
}

/// Registration and gender-ratio distributions per division. Divisions
/// without any defined ratio are left out of the ratio panel.
pub fn prepare_box(aggregates: &[DivisionAggregate]) -> BoxPlotData {
    let registration = BoxPanel {
        title: "Distribution of Active Registration by Division".to_string(),
        y_label: "Active Registration".to_string(),
        groups: aggregates
            .iter()
            .filter(|a| !a.registrations.is_empty())
            .map(|a| BoxGroup {
                label: a.division.clone(),
                values: a.registrations.clone(),
            })
            .collect(),
    };

    let gender_ratio = BoxPanel {
        title: "Distribution of Gender Ratio by Division".to_string(),
        y_label: "Gender Ratio (Females per 1000 Males)".to_string(),
        groups: aggregates
            .iter()
            .filter(|a| !a.gender_ratios.is_empty())
            .map(|a| BoxGroup {
                label: a.division.clone(),
                values: a.gender_ratios.clone(),
            })
            .collect(),
    };

    BoxPlotData {
        panels: vec![registration, gender_ratio],
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub value_label: String,
    pub outlier: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupedBar {
    pub label: String,
    pub male: f64,
    pub female: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChartData {
    pub top_title: String,
    pub top: Vec<Bar>,
    pub divisions: Vec<GroupedBar>,
}

impl BarChartData {
    pub fn is_empty(&self) -> bool {
        self.top.is_empty() && self.divisions.is_empty()
    }
}

/// Top districts by registration plus male/female totals per division.
/// `top` is expected in ranking order.
pub fn prepare_bar(
    top: &[&DerivedRecord],
    aggregates: &[DivisionAggregate],
    outliers: &[&DerivedRecord],
) -> BarChartData {
    let flagged: HashSet<(&str, &str)> = outliers
        .iter()
        .map(|d| (d.record.division.as_str(), d.record.district.as_str()))
        .collect();

    BarChartData {
        top_title: format!("Top {} Districts by Active Registration", top.len()),
        top: top
            .iter()
            .map(|d| {
                let value = d.record.active_registrations as f64;
                Bar {
                    label: format!("{} ({})", d.record.district, d.record.division),
                    value,
                    value_label: format_count(value),
                    outlier: flagged
                        .contains(&(d.record.division.as_str(), d.record.district.as_str())),
                }
            })
            .collect(),
        divisions: aggregates
            .iter()
            .map(|a| GroupedBar {
                label: a.division.clone(),
                male: a.total_male as f64,
                female: a.total_female as f64,
            })
            .collect(),
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
        .unwrap_or((0.0, 0.0))
}

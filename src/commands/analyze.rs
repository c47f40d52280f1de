use crate::analysis::{aggregate_by_division, clean, derive, detect_outliers, top_n};
use crate::charts::{
    prepare_bar, prepare_box, prepare_scatter, render_bar, render_box, render_scatter, RenderError,
    BAR_FILE, BOX_FILE, SCATTER_FILE,
};
use crate::config::AnalysisConfig;
use crate::formats::voter_csv;
use crate::model::MetricKey;
use crate::reports::generator::{generate_report, ReportInputs};
use crate::timing::{Stage, StageTimer};
use colored::*;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug)]
pub struct RunSummary {
    pub rows_loaded: usize,
    pub rows_kept: usize,
    pub rows_dropped: usize,
    pub charts_written: Vec<PathBuf>,
    pub chart_failures: Vec<String>,
    pub summary_path: PathBuf,
    pub total_duration_ms: u64,
}

/// Load, clean, derive, chart and summarize one registration table
pub fn analyze(config: &AnalysisConfig) -> Result<RunSummary, Box<dyn Error>> {
    println!(
        "🚀 Analyzing voter registrations from {}",
        config.input.display().to_string().bright_cyan()
    );

    let mut timer = StageTimer::new();

    timer.start_stage(Stage::Load);
    let table = voter_csv::load(&config.input)?;
    let rows_loaded = table.len();
    timer.end_stage(Stage::Load, Some(rows_loaded as u64));

    timer.start_stage(Stage::Clean);
    let cleaned = clean(table)?;
    timer.end_stage(Stage::Clean, Some(cleaned.records.len() as u64));

    println!(
        "📋 Loaded {} rows, kept {}, dropped {}",
        rows_loaded.to_string().bright_yellow(),
        cleaned.records.len().to_string().bright_green(),
        cleaned.dropped_count().to_string().bright_red()
    );

    timer.start_stage(Stage::Derive);
    let derived = derive(cleaned.records.clone());
    timer.end_stage(Stage::Derive, Some(derived.len() as u64));

    timer.start_stage(Stage::Aggregate);
    let aggregates = aggregate_by_division(&derived);
    let ratio_outliers = detect_outliers(&derived, MetricKey::GenderRatio, config.outlier_threshold)?;
    let registration_outliers = detect_outliers(
        &derived,
        MetricKey::ActiveRegistrations,
        config.outlier_threshold,
    )?;
    let top = top_n(&derived, config.top_n, MetricKey::ActiveRegistrations);
    timer.end_stage(Stage::Aggregate, Some(aggregates.len() as u64));

    fs::create_dir_all(&config.output_dir)?;

    timer.start_stage(Stage::Render);
    println!("\n📊 Generating visualizations...");

    let scatter_path = config.output_dir.join(SCATTER_FILE);
    let box_path = config.output_dir.join(BOX_FILE);
    let bar_path = config.output_dir.join(BAR_FILE);

    let attempts: Vec<(&str, PathBuf, Result<(), RenderError>)> = vec![
        (
            "Scatter plot",
            scatter_path.clone(),
            render_scatter(
                &scatter_path,
                &prepare_scatter(&derived, &ratio_outliers),
                &config.scatter,
            ),
        ),
        (
            "Box plot",
            box_path.clone(),
            render_box(&box_path, &prepare_box(&aggregates), &config.box_plot),
        ),
        (
            "Bar plot",
            bar_path.clone(),
            render_bar(
                &bar_path,
                &prepare_bar(&top, &aggregates, &registration_outliers),
                &config.bar,
            ),
        ),
    ];

    let mut charts_written = Vec::new();
    let mut chart_failures = Vec::new();
    for (name, path, result) in attempts {
        match result {
            Ok(()) => {
                println!(
                    "  ✅ {} saved as {}",
                    name,
                    path.display().to_string().bright_green()
                );
                charts_written.push(path);
            }
            Err(e) => {
                warn!(chart = name, error = %e, "chart not rendered");
                eprintln!("  ❌ {} failed: {}", name, e);
                chart_failures.push(e.to_string());
            }
        }
    }
    timer.end_stage(Stage::Render, Some(charts_written.len() as u64));

    timer.start_stage(Stage::Report);
    let input = config.input.display().to_string();
    let report = generate_report(&ReportInputs {
        input: &input,
        cleaned: &cleaned,
        derived: &derived,
        aggregates: &aggregates,
        ratio_outliers: &ratio_outliers,
        registration_outliers: &registration_outliers,
        top_n: config.top_n,
        outlier_threshold: config.outlier_threshold,
    });
    report.print();
    let summary_path = report.write_json(&config.output_dir)?;
    timer.end_stage(Stage::Report, None);

    timer.print_summary();

    let summary = RunSummary {
        rows_loaded,
        rows_kept: cleaned.records.len(),
        rows_dropped: cleaned.dropped_count(),
        charts_written,
        chart_failures,
        summary_path,
        total_duration_ms: timer.total_duration_ms(),
    };
    print_run_summary(&summary);

    if summary.charts_written.is_empty() {
        return Err(format!(
            "no chart could be rendered: {}",
            summary.chart_failures.join("; ")
        )
        .into());
    }

    Ok(summary)
}

fn print_run_summary(summary: &RunSummary) {
    println!("{}", "🎉 Analysis Complete!".bright_green().bold());
    println!("{}", "=".repeat(50).bright_green());
    println!(
        "{}: {}",
        "Rows Kept".bright_white().bold(),
        summary.rows_kept.to_string().bright_yellow()
    );
    println!(
        "{}: {}",
        "Rows Dropped".bright_white().bold(),
        summary.rows_dropped.to_string().bright_yellow()
    );
    println!("{}:", "Generated files".bright_white().bold());
    for path in &summary.charts_written {
        println!("  - {}", path.display());
    }
    println!("  - {}", summary.summary_path.display());
    if !summary.chart_failures.is_empty() {
        println!(
            "{}: {}",
            "Charts Failed".bright_red().bold(),
            summary.chart_failures.len().to_string().bright_red()
        );
    }
    println!();
}

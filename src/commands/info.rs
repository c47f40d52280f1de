use crate::analysis::{aggregate_by_division, clean, derive};
use crate::formats::voter_csv;
use colored::Colorize;
use std::error::Error;
use std::path::Path;

/// Validate the input and dump an overview without writing any files.
pub fn info(input: &Path) -> Result<(), Box<dyn Error>> {
    println!(
        "🔍 Inspecting {}",
        input.display().to_string().cyan()
    );

    let table = voter_csv::load(input)?;
    let rows_loaded = table.len();
    let has_other = table.has_other_column;
    let cleaned = clean(table)?;
    let derived = derive(cleaned.records.clone());
    let aggregates = aggregate_by_division(&derived);

    println!(
        "📋 {} rows, {} valid, {} dropped",
        rows_loaded,
        cleaned.records.len().to_string().green(),
        cleaned.dropped_count().to_string().red()
    );
    if !has_other {
        println!("   no other_count column, treated as 0");
    }

    for row in &cleaned.dropped {
        println!("   ⚠️  line {}: {}", row.line, row.reason);
    }

    let undefined_ratio = derived
        .iter()
        .filter(|d| d.metrics.gender_ratio.is_none())
        .count();
    if undefined_ratio > 0 {
        println!(
            "   {} districts with no male registrations (gender ratio undefined)",
            undefined_ratio
        );
    }

    println!("🗂️  {} divisions:", aggregates.len());
    for agg in &aggregates {
        println!(
            "  {} ({} districts): {}",
            agg.division.green(),
            agg.district_count(),
            agg.districts.join(", ")
        );
    }

    Ok(())
}

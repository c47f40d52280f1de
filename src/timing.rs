//! Per-stage wall-clock timing for a single run
use colored::*;
use instant::Instant;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Load,
    Clean,
    Derive,
    Aggregate,
    Render,
    Report,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Load => write!(f, "load"),
            Stage::Clean => write!(f, "clean"),
            Stage::Derive => write!(f, "derive"),
            Stage::Aggregate => write!(f, "aggregate"),
            Stage::Render => write!(f, "render"),
            Stage::Report => write!(f, "report"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StageMetrics {
    pub stage: Stage,
    pub duration_ms: u64,
    pub rows_processed: Option<u64>,
}

#[derive(Default)]
pub struct StageTimer {
    stage_timers: HashMap<Stage, Instant>,
    completed: Vec<StageMetrics>,
}

impl StageTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start timing a stage
    pub fn start_stage(&mut self, stage: Stage) {
        self.stage_timers.insert(stage, Instant::now());
    }

    /// End timing a stage and record it. A stage that was never started
    /// records zero.
    pub fn end_stage(&mut self, stage: Stage, rows_processed: Option<u64>) -> &StageMetrics {
        let duration_ms = self
            .stage_timers
            .remove(&stage)
            .map(|start| start.elapsed().as_millis() as u64)
            .unwrap_or(0);

        self.completed.push(StageMetrics {
            stage,
            duration_ms,
            rows_processed,
        });
        &self.completed[self.completed.len() - 1]
    }

    pub fn completed(&self) -> &[StageMetrics] {
        &self.completed
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.completed.iter().map(|m| m.duration_ms).sum()
    }

    /// Print performance summary
    pub fn print_summary(&self) {
        println!("\n{}", "⏱️  Run Timing Summary".bright_cyan().bold());
        println!("{}", "=".repeat(50).bright_cyan());

        for metric in &self.completed {
            let stage_color = match metric.stage {
                Stage::Load => "yellow",
                Stage::Clean => "magenta",
                Stage::Derive => "blue",
                Stage::Aggregate => "blue",
                Stage::Render => "green",
                Stage::Report => "bright_green",
            };

            println!(
                "{}: {} ms{}",
                metric.stage.to_string().color(stage_color),
                metric.duration_ms.to_string().bright_white(),
                if let Some(rows) = metric.rows_processed {
                    format!(" ({} rows)", rows.to_string().bright_yellow())
                } else {
                    String::new()
                }
            );
        }

        println!("{}", "-".repeat(50).bright_cyan());
        println!(
            "{}: {} ms",
            "Total Duration".bright_white().bold(),
            self.total_duration_ms().to_string().bright_green().bold()
        );
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_stages_in_order() {
        let mut timer = StageTimer::new();
        timer.start_stage(Stage::Load);
        timer.end_stage(Stage::Load, Some(12));
        timer.start_stage(Stage::Clean);
        let clean = timer.end_stage(Stage::Clean, None).stage;
        assert_eq!(clean, Stage::Clean);

        let stages: Vec<Stage> = timer.completed().iter().map(|m| m.stage).collect();
        assert_eq!(stages, vec![Stage::Load, Stage::Clean]);
        assert_eq!(timer.completed()[0].rows_processed, Some(12));
    }

    #[test]
    fn unstarted_stage_is_zero() {
        let mut timer = StageTimer::new();
        assert_eq!(timer.end_stage(Stage::Render, None).duration_ms, 0);
        assert_eq!(timer.total_duration_ms(), 0);
    }
}

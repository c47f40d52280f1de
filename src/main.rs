use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use voter_stats::commands::{analyze, info};
use voter_stats::config::{AnalysisConfig, CliOverrides, FileConfig};

#[derive(Parser)]
#[clap(name = "voter-stats", about = "Voter registration statistics and charts")]
struct Opts {
    /// JSON config file
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Input CSV (default: data.csv)
    #[clap(long, global = true)]
    input: Option<PathBuf>,

    /// Directory for charts and summary.json (default: .)
    #[clap(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Number of districts in the top ranking (default: 10)
    #[clap(long, global = true)]
    top_n: Option<usize>,

    /// IQR multiplier for the outlier fence (default: 1.5)
    #[clap(long, global = true)]
    outlier_threshold: Option<f64>,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Clean, chart and summarize the input. This is the default.
    Analyze,
    /// Validate the input and dump info about it.
    Info,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let opts = Opts::parse();

    let file_config = match &opts.config {
        Some(path) => match FileConfig::load(path) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!("❌ {}", e);
                std::process::exit(1);
            }
        },
        None => None,
    };

    let config = AnalysisConfig::resolve(
        file_config,
        CliOverrides {
            input: opts.input,
            output_dir: opts.output_dir,
            top_n: opts.top_n,
            outlier_threshold: opts.outlier_threshold,
        },
    );

    match opts.command.unwrap_or(Command::Analyze) {
        Command::Analyze => {
            if let Err(e) = analyze(&config) {
                eprintln!("❌ Analysis failed: {}", e);
                std::process::exit(1);
            }
        }
        Command::Info => {
            if let Err(e) = info(&config.input) {
                eprintln!("❌ Validation failed: {}", e);
                std::process::exit(1);
            }
        }
    }
}

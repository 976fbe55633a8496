//! chantflow - generate chant contour and differentia datasets
//!
//! Subcommands:
//! - `chantflow contours [--genre <name|all>]` - phrase and random contours of the Liber Usualis
//! - `chantflow differentiae [--chants <csv>]` - differentia/antiphon connections
//! - `chantflow config` - print the effective configuration

use std::path::PathBuf;

use anyhow::{Context, Result};
use chantconf::ChantConfig;
use chantflow::{commands, telemetry};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "chantflow")]
#[command(about = "Generate chant contour and differentia datasets")]
#[command(version)]
struct Cli {
    /// Config file to use instead of ./chantflow.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract phrase contour datasets
    Contours {
        /// Genre to generate (`antiphons`, `kyries`, ...) or `all`
        #[arg(short, long, default_value = "all")]
        genre: String,
    },

    /// Extract differentia/antiphon connections
    Differentiae {
        /// Chant table (defaults to <dataset_dir>/cantuscorpus/csv/chant.csv)
        #[arg(long)]
        chants: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ChantConfig::load_from(cli.config.as_deref()).context("Failed to load config")?;

    match cli.command {
        Commands::Config => {
            print!("{}", config.to_toml());
        }
        Commands::Contours { genre } => {
            let run_log = telemetry::init(&config.logging.level)?;
            let reports = commands::contours::run(&config, &run_log, &genre)?;
            for report in reports {
                println!(
                    "{}: {} phrase contours, {} random contours",
                    report.dataset_id, report.phrase_contours, report.random_contours
                );
            }
        }
        Commands::Differentiae { chants } => {
            let run_log = telemetry::init(&config.logging.level)?;
            let report = commands::differentiae::run(&config, &run_log, chants.as_deref())?;
            println!(
                "{} connections written to {} (checksum {})",
                report.stats.extracted,
                report.path.display(),
                report.checksum
            );
        }
    }

    Ok(())
}

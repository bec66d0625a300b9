use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dsr::compare::compare_metrics;
use dsr::config::RunConfig;
use dsr::evaluation::{class_counts, max_k_size};
use dsr::loader::{System, load_system};

use crate::classifier::{MetricArg, OutputFormat, StatisticArg};
use crate::ui;

/// k-nearest-neighbor classification of decision systems
#[derive(Parser, Debug)]
#[command(name = "dsr", version)]
#[command(about = "Classify a test decision system against a training system and report its quality")]
pub struct Cli {
    /// Log debug details (RUST_LOG overrides this)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify the test system with one metric and print the prediction matrix
    Classify {
        #[command(flatten)]
        systems: SystemArgs,

        /// Distance metric
        #[arg(short, long, value_enum, default_value_t = MetricArg::Canberra)]
        metric: MetricArg,

        /// Number of smallest distances summed per class
        #[arg(short, default_value_t = 1)]
        k: usize,

        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Classify the test system with every metric and compare them per class
    Compare {
        #[command(flatten)]
        systems: SystemArgs,

        /// Number of smallest distances summed per class
        #[arg(short, default_value_t = 1)]
        k: usize,

        /// Statistic shown in the table
        #[arg(short, long, value_enum, default_value_t = StatisticArg::Accuracy)]
        statistic: StatisticArg,

        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Show the class populations of a training system and the largest usable k
    MaxK {
        /// Training system file
        #[arg(long = "trn")]
        training: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct SystemArgs {
    /// Training system file
    #[arg(long = "trn")]
    pub training: PathBuf,

    /// Test system file
    #[arg(long = "tst")]
    pub test: PathBuf,
}

fn load(path: &Path, role: &str) -> Result<System> {
    load_system(path).with_context(|| format!("failed to load the {role} system from {}", path.display()))
}

/// Runs the selected command, writing results to stdout.
pub fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Classify {
            systems,
            metric,
            k,
            format,
        } => {
            let config = RunConfig::new(systems.training, systems.test, metric.into(), k);
            let report = dsr::run(&config)?;
            match format {
                OutputFormat::Table => print!("{}", ui::render_report(&report)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            }
        }
        Command::Compare {
            systems,
            k,
            statistic,
            format,
        } => {
            let training = load(&systems.training, "training")?;
            let test = load(&systems.test, "test")?;
            let comparison = compare_metrics(&training, &test, k, statistic.into())?;
            match format {
                OutputFormat::Table => print!("{}", ui::render_comparison(&comparison)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&comparison)?),
            }
        }
        Command::MaxK { training } => {
            let training = load(&training, "training")?;
            let max = max_k_size(&training).context("the training system is empty")?;
            print!("{}", ui::render_class_counts(&class_counts(&training), max));
        }
    }
    Ok(())
}

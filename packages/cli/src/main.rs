#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the taxi neighborhood pipeline.
//!
//! Uses `indicatif-log-bridge` (via [`taxi_nbhd_cli_utils::init_logger`])
//! so that log lines and progress bars share the terminal.

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{Overrides, PipelineConfig};

#[derive(Parser)]
#[command(
    name = "taxi_nbhd",
    about = "Assigns NYC taxi pickups and dropoffs to neighborhoods"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Config file (default: `taxi_nbhd.toml` if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory holding trip files, boundaries, and outputs
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Decimal places to round coordinates to (0-9)
    #[arg(long, global = true)]
    decimals: Option<u32>,
}

#[derive(Args)]
struct LocationArgs {
    /// Worker threads for resolution; more than one partitions the sweep
    #[arg(long)]
    threads: Option<usize>,
    /// Resolve pickup locations only
    #[arg(long)]
    pickups_only: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write neighborhood centroid and border tables
    Boundaries,
    /// Deduplicate trip coordinates, resolve them, and write the location cache
    Locations(LocationArgs),
    /// Print the cached neighborhood for one coordinate
    Lookup {
        /// Longitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Latitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
    },
    /// Build cleaned trip summaries from the location cache
    Summarize {
        /// Daily weather CSV to join onto the neighborhood summary
        #[arg(long)]
        weather: Option<PathBuf>,
    },
    /// Run boundaries, locations, and summarize in sequence
    All {
        #[command(flatten)]
        locations: LocationArgs,
        /// Daily weather CSV to join onto the neighborhood summary
        #[arg(long)]
        weather: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = taxi_nbhd_cli_utils::init_logger();
    let cli = Cli::parse();

    let mut config = PipelineConfig::resolve(&Overrides {
        config: cli.global.config,
        data_dir: cli.global.data_dir,
        decimals: cli.global.decimals,
    })?;

    match cli.command {
        Commands::Boundaries => {
            commands::boundaries(&config)?;
        }
        Commands::Locations(args) => {
            args.apply(&mut config)?;
            commands::locations(&config, &multi)?;
        }
        Commands::Lookup { lon, lat } => {
            println!("{}", commands::lookup(&config, lon, lat)?);
        }
        Commands::Summarize { weather } => {
            commands::summarize(&config, &multi, weather.as_deref())?;
        }
        Commands::All { locations, weather } => {
            locations.apply(&mut config)?;
            commands::all(&config, &multi, weather.as_deref())?;
        }
    }

    Ok(())
}

impl LocationArgs {
    fn apply(&self, config: &mut PipelineConfig) -> Result<(), config::ConfigError> {
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if self.pickups_only {
            config.include_dropoffs = false;
        }
        config.validate()
    }
}

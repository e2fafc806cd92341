//! RadarScope CLI - Command-line interface
//!
//! Runs the live tracker against the airplanes.live feed and offers a few
//! helpers for inspecting configuration and calibration.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::config::ConfigCommands;
use commands::map::MapArgs;
use commands::run::RunArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "radarscope")]
#[command(version = radarscope::VERSION)]
#[command(about = "Live aircraft tracker for a calibrated background map", long_about = None)]
struct Cli {
    /// Config file to use instead of ~/.radarscope/config.ini
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Track aircraft until interrupted with Ctrl-C
    Run(RunArgs),

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Convert between geographic and pixel coordinates
    Map(MapArgs),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(cli.config.as_deref(), args),
        Commands::Config { command } => commands::config::run(cli.config.as_deref(), command),
        Commands::Map(args) => commands::map::run(cli.config.as_deref(), args),
    };

    if let Err(e) = result {
        e.exit();
    }
}

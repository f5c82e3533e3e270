//! Tradegate CLI.
//!
//! Evaluates the trade approval policy for a caller described in an identity
//! file.
//!
//! # Quick Start
//!
//! ```bash
//! # Approve a trade as the caller in alice.json
//! tradegate approve-trade --identity alice.json 50000
//!
//! # Dump the caller's attributes
//! tradegate report --identity alice.json --extra department
//! ```
//!
//! Exit codes: 0 when allowed, 1 when denied, 2 when the request could not
//! be evaluated.

mod commands;
mod style;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tradegate_config::{ConfigLoader, TradegateConfig};

use crate::style::print_error;

/// Tradegate - attribute-based trade approval.
#[derive(Parser)]
#[command(name = "tradegate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Project directory holding tradegate.toml.
    #[arg(long, global = true, default_value = ".")]
    project: PathBuf,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,

    /// Print decisions as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version information.
    Version,

    /// Decide whether the caller may approve a trade.
    ApproveTrade {
        /// Identity file (JSON, or TOML by extension).
        #[arg(short, long)]
        identity: PathBuf,

        /// Request arguments. The first is the trade amount.
        args: Vec<String>,
    },

    /// Decide whether the caller belongs to the required department.
    AssertDepartment {
        /// Identity file (JSON, or TOML by extension).
        #[arg(short, long)]
        identity: PathBuf,
    },

    /// Print the caller's identity attributes.
    Report {
        /// Identity file (JSON, or TOML by extension).
        #[arg(short, long)]
        identity: PathBuf,

        /// Extra attribute to include (repeatable). Defaults to report.extra_attributes.
        #[arg(short, long = "extra")]
        extra: Vec<String>,

        /// Output format (json, text).
        #[arg(short, long, default_value = "json")]
        format: String,
    },

    /// Configuration management.
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the merged configuration.
    Show {
        /// Output format (text, json, toml).
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Validate the configuration files.
    Validate,
}

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn required(loaded: Result<TradegateConfig>) -> Result<TradegateConfig> {
    loaded.context("Failed to load configuration")
}

fn run(cli: Cli, loaded: Result<TradegateConfig>) -> Result<ExitCode> {
    match cli.command {
        Commands::Version => {
            commands::version::run();
            Ok(ExitCode::SUCCESS)
        }
        Commands::ApproveTrade { identity, args } => {
            commands::approve_trade::run(&required(loaded)?, &identity, &args, cli.json)
        }
        Commands::AssertDepartment { identity } => {
            commands::assert_department::run(&required(loaded)?, &identity, cli.json)
        }
        Commands::Report {
            identity,
            extra,
            format,
        } => {
            commands::report::run(&required(loaded)?, &identity, &extra, &format)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config(ConfigCommands::Show { format }) => {
            commands::config::show(&required(loaded)?, &format)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config(ConfigCommands::Validate) => {
            Ok(commands::config::validate(&cli.project, &loaded))
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    style::set_no_color(cli.no_color || std::env::var_os("NO_COLOR").is_some());

    let loaded = ConfigLoader::new().with_project_dir(&cli.project).load();
    init_logging(
        loaded
            .as_ref()
            .map_or("info", |config| config.logging.level.as_str()),
    );

    match run(cli, loaded) {
        Ok(code) => code,
        Err(e) => {
            print_error(&format!("{e:#}"));
            ExitCode::from(commands::EXIT_ERROR)
        }
    }
}

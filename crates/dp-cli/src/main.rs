use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dp_cli::commands::{events, plan, tasks};
use dp_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so JSON output stays parseable
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let mut config =
        Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    config.apply(&cli.overrides);
    tracing::debug!(?config, "loaded configuration");

    let date = cli
        .overrides
        .date
        .unwrap_or_else(|| Local::now().date_naive());
    let mut stdout = std::io::stdout().lock();

    match &cli.command {
        Some(Commands::Plan { json, dry_run }) => {
            plan::run(&mut stdout, &config, date, *json, *dry_run)?;
        }
        Some(Commands::Events { json }) => {
            events::run(&mut stdout, &config, date, *json)?;
        }
        Some(Commands::Tasks { json }) => {
            tasks::run(&mut stdout, &config, *json)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}

//! rap-agent - plan one game turn from the command line
//!
//! Reads a turn as JSON (`{rules, observation, available_actions}`) from
//! `--turn <file>` or stdin, runs the RAP planner, and writes the chosen
//! action as JSON to stdout. Logs go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use engine_core::Turn;
use std::io::Read;
use tracing::info;

use rap_agent::config::Config;
use rap_agent::RapAgent;

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}

fn read_turn(config: &Config) -> Result<Turn> {
    let raw = match &config.turn {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read turn file {}", path.display()))?,
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read turn from stdin")?;
            raw
        }
    };
    serde_json::from_str(&raw).context("turn is not valid JSON")
}

fn main() -> Result<()> {
    eprintln!("rap-agent starting...");

    // Parse configuration
    let config = Config::parse();

    // Validate configuration
    config.validate()?;

    // Initialize tracing
    init_tracing(&config.log_level)?;
    info!(log_level = %config.log_level, "Tracing initialized");

    let turn = read_turn(&config)?;
    info!(
        game = %turn.rules.title,
        predefined = turn.available_actions.predefined.len(),
        openended = turn.available_actions.openended.len(),
        "Turn loaded"
    );

    let mut agent = RapAgent::new(&config.to_central())?;
    info!(
        backend = %config.backend,
        simulations = config.num_simulations,
        depth_limit = config.depth_limit,
        "Planning"
    );

    let action = turn.play(&mut agent, config.verbose);
    println!("{}", serde_json::to_string(&action)?);

    if action.is_none() {
        info!("No action chosen");
    }
    Ok(())
}

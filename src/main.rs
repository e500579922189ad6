// ABOUTME: Entry point for the s3-deployer CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use s3_deployer::config;
use s3_deployer::error::Result;
use s3_deployer::output::{Output, OutputMode};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = OutputMode::from_flags(cli.quiet, cli.json);

    if let Err(e) = run(cli, Output::new(mode)).await {
        Output::new(mode).error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: Output) -> Result<()> {
    let cwd = env::current_dir()?;
    let destination = cli.destination.as_deref();

    match cli.command {
        Commands::Init {
            bucket,
            app_path,
            force,
        } => {
            config::init_config(&cwd, bucket.as_deref(), app_path.as_deref(), force)?;
            output.success(&format!("Created {}", config::CONFIG_FILENAME));
            Ok(())
        }
        Commands::Stage { revision } => {
            let config = commands::load_config(&cwd, destination)?;
            commands::stage(config, &cwd, revision, output).await
        }
        Commands::Switch { revision } => {
            let Some(target) = revision.filter(|r| !r.trim().is_empty()) else {
                output.warning("No revision specified; pass --revision or set REVISION");
                std::process::exit(1);
            };
            let config = commands::load_config(&cwd, destination)?;
            commands::switch(config, &cwd, target.trim(), output).await
        }
        Commands::Deploy { revision } => {
            let config = commands::load_config(&cwd, destination)?;
            commands::deploy(config, &cwd, revision, output).await
        }
        Commands::Current => {
            let config = commands::load_config(&cwd, destination)?;
            commands::current(config, &cwd, output).await
        }
        Commands::List => {
            let config = commands::load_config(&cwd, destination)?;
            commands::list(config, &cwd, output).await
        }
        Commands::Changes { from, to } => {
            let config = commands::load_config(&cwd, destination)?;
            commands::changes(config, &cwd, &from, &to, output).await
        }
    }
}

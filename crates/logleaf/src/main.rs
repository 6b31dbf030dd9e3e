//! LogLeaf CLI - append-only file logger with weekly rotation

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};
use commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    output::set_json_mode(cli.json);

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("logleaf={log_level},logleaf_logs={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).without_time())
        .init();

    if let Err(e) = run(cli).await {
        output::print_error(&format!("Error: {}", e));
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let settings = || load_config(cli.config.as_deref(), &cli.target);

    match cli.command {
        Commands::Write(args) => write::execute(settings()?, args),
        Commands::Pipe(args) => pipe::execute(settings()?, args),
        Commands::Show => show::execute(settings()?),
        Commands::Tail(args) => tail::execute(settings()?, args).await,
        Commands::Rotate { force } => rotate::execute(settings()?, force),
        Commands::Prune { keep } => prune::execute(settings()?, keep),
        Commands::Archives => archives::execute(settings()?),
        Commands::Classify { user_agent } => classify::execute(&user_agent),
        Commands::Config => config::execute(settings()?),
    }
}

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;
mod config;
mod error;
mod output;
mod parser;
mod prompt;
mod provider;
mod reducer;
mod runner;
mod scaffold;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("prism=debug")
    } else {
        EnvFilter::new("prism=info")
    };

    // Logs go to stderr; stdout carries command output and streamed bands
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run(args) => cli::run::execute(args).await,
        Commands::Reduce(args) => cli::reduce::execute(args),
        Commands::Scaffold(args) => cli::scaffold::execute(args),
        Commands::Schema => cli::schema::execute(),
    }
}

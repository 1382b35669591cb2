mod commands;
mod output;
mod server;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use portfolio_lib::PortfolioConfig;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "portfolio")]
#[command(about = "Render an academic portfolio from published sheets and relay contact messages")]
struct Cli {
    /// Output format: table, json, csv or markdown
    #[arg(long, default_value = "table", global = true)]
    output: String,

    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the configured sections and their sheet sources
    Sections,
    /// Load all sheets and print the sections
    Render(commands::render::RenderArgs),
    /// Serve the portfolio page and the contact relay
    Serve(commands::serve::ServeArgs),
    /// Send a contact message
    Contact(commands::contact::ContactArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("portfolio=info".parse()?),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let format = OutputFormat::from_arg(&cli.output);
    let config = PortfolioConfig::load(cli.config.as_deref())?;

    match &cli.command {
        Commands::Sections => commands::sections::run(&config, &format)?,
        Commands::Render(args) => commands::render::run(args, &config, &format).await?,
        Commands::Serve(args) => commands::serve::run(args, config).await?,
        Commands::Contact(args) => commands::contact::run(args, &config, &format).await?,
    }

    Ok(())
}

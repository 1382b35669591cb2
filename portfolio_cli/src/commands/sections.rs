//! The `sections` subcommand: lists the source registry.

use anyhow::Result;
use portfolio_lib::PortfolioConfig;

use crate::output::{print_sections, OutputFormat};

pub fn run(config: &PortfolioConfig, format: &OutputFormat) -> Result<()> {
    let registry = config.registry();
    let client = config.sheets_client();
    eprintln!("{} sections configured", registry.len());
    print_sections(&registry, &client, format)
}

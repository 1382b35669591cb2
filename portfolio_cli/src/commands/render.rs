//! The `render` subcommand: loads every sheet once and prints the sections,
//! or writes the full HTML page.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Args;
use portfolio_lib::{
    render_page, select, Aggregator, LoadState, PageContext, PortfolioConfig, PortfolioData,
    Record, Section, SectionView, Templates,
};

use crate::output::{
    print_json, print_section_csv, print_section_markdown, print_section_table, OutputFormat,
};

#[derive(Args)]
pub struct RenderArgs {
    /// Only print this section (camelCase key, e.g. journalPublications)
    #[arg(long)]
    pub section: Option<String>,

    /// Also write the full HTML page to this path
    #[arg(long)]
    pub html: Option<PathBuf>,
}

/// Valid records keyed by section; sections without any are left out.
fn valid_records<'a>(
    sections: &[Section],
    data: &'a PortfolioData,
) -> BTreeMap<&'static str, Vec<&'a Record>> {
    sections
        .iter()
        .map(|s| {
            let rows: Vec<&Record> = data.rows(*s).iter().filter(|r| r.is_valid()).collect();
            (s.key(), rows)
        })
        .filter(|(_, rows)| !rows.is_empty())
        .collect()
}

pub async fn run(args: &RenderArgs, config: &PortfolioConfig, format: &OutputFormat) -> Result<()> {
    let requested = args
        .section
        .as_deref()
        .map(str::parse::<Section>)
        .transpose()?;

    let registry = config.registry();
    if let Some(section) = requested {
        if registry.sheet_id(section).is_none() {
            bail!("section '{}' is not in the registry", section.key());
        }
    }

    let aggregator = Aggregator::new(Arc::new(config.sheets_client()), registry.clone());
    let data = aggregator.load().await?;
    tracing::info!("Loaded {} sections", data.len());

    let sections = match requested {
        Some(section) => vec![section],
        None => select::generic_sections(&registry, &data),
    };
    let views: Vec<SectionView> = sections
        .iter()
        .filter_map(|s| SectionView::for_section(*s, data.rows(*s)))
        .collect();

    if views.is_empty() {
        eprintln!("No records to show");
    }

    match format {
        OutputFormat::Json => print_json(&valid_records(&sections, &data)),
        OutputFormat::Csv => {
            for view in &views {
                print_section_csv(view)?;
            }
        }
        OutputFormat::Markdown => views.iter().for_each(print_section_markdown),
        OutputFormat::Table => views.iter().for_each(print_section_table),
    }

    if let Some(ref path) = args.html {
        let templates = Templates::new()?;
        let state = LoadState::Ready(Arc::new(data));
        let html = render_page(
            &templates,
            &state,
            &registry,
            &PageContext::new(&config.fallback_email),
        )?;
        std::fs::write(path, html)?;
        eprintln!("Wrote {}", path.display());
    }

    Ok(())
}

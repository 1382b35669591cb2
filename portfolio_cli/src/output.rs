use anyhow::Result;
use portfolio_lib::sheets_api::Client;
use portfolio_lib::{SectionView, SourceRegistry};
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

impl OutputFormat {
    /// Unknown names fall back to a plain table.
    pub fn from_arg(value: &str) -> Self {
        match value {
            "json" => OutputFormat::Json,
            "csv" => OutputFormat::Csv,
            "markdown" | "md" => OutputFormat::Markdown,
            _ => OutputFormat::Table,
        }
    }
}

#[derive(Tabled, Serialize)]
struct SectionRow {
    #[tabled(rename = "Key")]
    #[serde(rename = "Key")]
    key: String,
    #[tabled(rename = "Title")]
    #[serde(rename = "Title")]
    title: String,
    #[tabled(rename = "Sheet ID")]
    #[serde(rename = "Sheet ID")]
    sheet_id: String,
    #[tabled(rename = "Export URL")]
    #[serde(rename = "Export URL")]
    export_url: String,
}

// -- Row builders --

fn build_section_rows(registry: &SourceRegistry, client: &Client) -> Vec<SectionRow> {
    registry
        .entries()
        .iter()
        .map(|entry| SectionRow {
            key: entry.section.key().to_string(),
            title: entry.section.title().to_string(),
            sheet_id: entry.sheet_id.clone(),
            export_url: client
                .export_url(&entry.sheet_id)
                .map(|u| u.to_string())
                .unwrap_or_default(),
        })
        .collect()
}

/// Table with the section's columns as header and one line per valid row.
fn build_records_table(view: &SectionView) -> Table {
    let mut builder = Builder::default();
    builder.push_record(view.columns.iter().cloned());
    for row in view.text_rows() {
        builder.push_record(row);
    }
    builder.build()
}

// -- Registry output --

pub fn print_sections(registry: &SourceRegistry, client: &Client, format: &OutputFormat) -> Result<()> {
    let rows = build_section_rows(registry, client);
    match format {
        OutputFormat::Table => println!("{}", Table::new(&rows)),
        OutputFormat::Markdown => {
            let mut table = Table::new(&rows);
            table.with(Style::markdown());
            println!("{}", table);
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            for row in rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }
        OutputFormat::Json => print_json(&rows),
    }
    Ok(())
}

// -- Section record output --

pub fn print_section_table(view: &SectionView) {
    println!("{}\n{}", view.title, build_records_table(view));
}

pub fn print_section_markdown(view: &SectionView) {
    let mut table = build_records_table(view);
    table.with(Style::markdown());
    println!("## {}\n\n{}\n", view.title, table);
}

pub fn print_section_csv(view: &SectionView) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    write_section_csv(&mut wtr, view)?;
    wtr.flush()?;
    Ok(())
}

fn write_section_csv<W: std::io::Write>(wtr: &mut csv::Writer<W>, view: &SectionView) -> Result<()> {
    wtr.write_record(&view.columns)?;
    for row in view.text_rows() {
        wtr.write_record(&row)?;
    }
    Ok(())
}

// -- JSON output --

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

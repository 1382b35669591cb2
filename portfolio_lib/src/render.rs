//! Generic table/card renderer for any section's records.
//!
//! Both layouts are produced from one [`SectionView`], so the desktop table
//! and the narrow-screen cards always agree on columns and on which cells
//! are links.

use serde::Serialize;
use sheets_api::Record;
use url::Url;

use crate::error::PortfolioError;
use crate::section::Section;
use crate::templates::{self, Templates};

/// How a cell value is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Link,
    Text,
}

/// A value is a link iff it is an absolute URL with an http(s) scheme.
/// `www.example.org` or `doi.org/...` stay plain text.
pub fn classify(value: &str) -> CellKind {
    if !value.starts_with("http") {
        return CellKind::Text;
    }
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => CellKind::Link,
        _ => CellKind::Text,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellView {
    pub column: String,
    pub value: String,
    pub is_link: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowView {
    /// 1-based position among the valid rows.
    pub number: usize,
    pub cells: Vec<CellView>,
}

/// Columns and classified cells of one section, ready for either layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionView {
    pub key: String,
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<RowView>,
    pub count: usize,
}

impl SectionView {
    /// Builds a view from the valid records; `None` when nothing is valid.
    ///
    /// Columns come from the first valid record, in its key order.
    pub fn build(key: &str, title: &str, records: &[Record]) -> Option<Self> {
        let valid: Vec<&Record> = records.iter().filter(|r| r.is_valid()).collect();
        let first = valid.first()?;
        let columns: Vec<String> = first.columns().map(str::to_string).collect();

        let rows: Vec<RowView> = valid
            .iter()
            .enumerate()
            .map(|(i, record)| RowView {
                number: i + 1,
                cells: columns
                    .iter()
                    .map(|col| {
                        let value = record.get(col).unwrap_or("");
                        CellView {
                            column: col.clone(),
                            value: value.to_string(),
                            is_link: classify(value) == CellKind::Link,
                        }
                    })
                    .collect(),
            })
            .collect();

        Some(Self {
            key: key.to_string(),
            title: title.to_string(),
            count: rows.len(),
            columns,
            rows,
        })
    }

    pub fn for_section(section: Section, records: &[Record]) -> Option<Self> {
        Self::build(section.key(), section.title(), records)
    }

    /// Plain cell text, row by row, in column order.
    pub fn text_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.cells.iter().map(|c| c.value.clone()).collect())
            .collect()
    }
}

pub fn render_table(templates: &Templates, view: &SectionView) -> Result<String, PortfolioError> {
    templates.render(templates::SECTION_TABLE, view)
}

pub fn render_cards(templates: &Templates, view: &SectionView) -> Result<String, PortfolioError> {
    templates.render(templates::SECTION_CARDS, view)
}

/// Full `<section>` with heading, table and cards.
pub fn render_section(templates: &Templates, view: &SectionView) -> Result<String, PortfolioError> {
    templates.render(templates::SECTION, view)
}

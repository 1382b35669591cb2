//! Decides which sections have something to show.

use crate::aggregate::PortfolioData;
use crate::section::{Section, SourceRegistry};

/// True if a section has content worth rendering.
///
/// The identity section is shown whenever it is present; everything else
/// needs at least one record with a non-empty cell.
pub fn is_renderable(section: Section, data: &PortfolioData) -> bool {
    match data.get(section) {
        None => false,
        Some(_) if section == Section::BasicInfo => true,
        Some(rows) => rows.iter().any(|r| r.is_valid()),
    }
}

/// Renderable sections in registry order.
pub fn renderable_sections(registry: &SourceRegistry, data: &PortfolioData) -> Vec<Section> {
    registry
        .sections()
        .filter(|s| is_renderable(*s, data))
        .collect()
}

/// Renderable sections that go through the generic table/card renderer.
pub fn generic_sections(registry: &SourceRegistry, data: &PortfolioData) -> Vec<Section> {
    renderable_sections(registry, data)
        .into_iter()
        .filter(|s| !s.is_specialized())
        .collect()
}

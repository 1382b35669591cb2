//! Assembles the single HTML page for the current load state.

use chrono::Datelike;
use serde::Serialize;

use crate::aggregate::{LoadState, PortfolioData};
use crate::error::PortfolioError;
use crate::profile::{ContactBanner, ContactBlock, HeroView, ResearchBlock};
use crate::render::SectionView;
use crate::section::SourceRegistry;
use crate::select;
use crate::templates::{self, Templates};

/// Per-request inputs that do not come from the sheets.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub fallback_email: String,
    pub banner: Option<ContactBanner>,
    pub year: i32,
}

impl PageContext {
    pub fn new(fallback_email: &str) -> Self {
        Self {
            fallback_email: fallback_email.to_string(),
            banner: None,
            year: chrono::Utc::now().year(),
        }
    }

    pub fn with_banner(mut self, banner: ContactBanner) -> Self {
        self.banner = Some(banner);
        self
    }
}

#[derive(Debug, Serialize)]
struct PageView {
    title: String,
    loading: bool,
    error: bool,
    hero: Option<HeroView>,
    about: Option<String>,
    sections: Vec<SectionView>,
    research: Option<ResearchBlock>,
    contact: Option<ContactBlock>,
    year: i32,
}

impl PageView {
    fn status(loading: bool, year: i32) -> Self {
        Self {
            title: "Portfolio".to_string(),
            loading,
            error: !loading,
            hero: None,
            about: None,
            sections: Vec::new(),
            research: None,
            contact: None,
            year,
        }
    }

    fn ready(data: &PortfolioData, registry: &SourceRegistry, ctx: &PageContext) -> Self {
        let Some(hero) = HeroView::from_data(data) else {
            tracing::warn!("basicInfo is empty, showing error view");
            return Self::status(false, ctx.year);
        };

        let sections = select::generic_sections(registry, data)
            .into_iter()
            .filter_map(|s| SectionView::for_section(s, data.rows(s)))
            .collect();

        Self {
            title: format!("{} | Portfolio", hero.identity.full_name),
            loading: false,
            error: false,
            about: hero.identity.about.clone(),
            hero: Some(hero),
            sections,
            research: ResearchBlock::from_data(data),
            contact: Some(
                ContactBlock::new(Some(data), &ctx.fallback_email).with_banner(ctx.banner.clone()),
            ),
            year: ctx.year,
        }
    }
}

/// Renders the page for `state`. Pure: the same inputs give the same HTML.
pub fn render_page(
    templates: &Templates,
    state: &LoadState,
    registry: &SourceRegistry,
    ctx: &PageContext,
) -> Result<String, PortfolioError> {
    let view = match state {
        LoadState::Loading => PageView::status(true, ctx.year),
        LoadState::Failed(_) => PageView::status(false, ctx.year),
        LoadState::Ready(data) => PageView::ready(data, registry, ctx),
    };
    templates.render(templates::PAGE, &view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::Section;
    use sheets_api::Record;
    use std::sync::Arc;

    fn rec(pairs: &[(&str, &str)]) -> Record {
        Record::from_pairs(pairs.iter().copied())
    }

    fn ctx() -> PageContext {
        PageContext {
            fallback_email: "fallback@uni.edu".to_string(),
            banner: None,
            year: 2026,
        }
    }

    fn data() -> PortfolioData {
        PortfolioData::from_sections([
            (
                Section::BasicInfo,
                vec![rec(&[
                    ("Full Name", "Dr. Grace Hopper"),
                    ("Designation", "Professor"),
                    ("Department", "Computing"),
                    ("About", "Compilers & languages."),
                ])],
            ),
            (
                Section::Awards,
                vec![rec(&[
                    ("Award", "Best Paper"),
                    ("Link", "https://awards.example.org/1"),
                ])],
            ),
            (Section::Patents, vec![rec(&[("Title", ""), ("Year", "")])]),
            (
                Section::Books,
                vec![rec(&[("Title", "A Book"), ("Publisher", "Press")])],
            ),
            (Section::ContactMe, vec![rec(&[("mail", "grace@uni.edu")])]),
        ])
    }

    fn render(state: &LoadState, ctx: &PageContext) -> String {
        let templates = Templates::new().unwrap();
        render_page(&templates, state, &SourceRegistry::default(), ctx).unwrap()
    }

    #[test]
    fn loading_view() {
        let html = render(&LoadState::Loading, &ctx());
        assert!(html.contains("Loading Portfolio..."));
        assert!(!html.contains("Try Again"));
    }

    #[test]
    fn failed_view_has_retry() {
        let html = render(&LoadState::Failed("boom".into()), &ctx());
        assert!(html.contains("Unable to Load Portfolio"));
        assert!(html.contains(r#"href="/">Try Again"#));
    }

    #[test]
    fn empty_basic_info_is_error_view() {
        let state = LoadState::Ready(Arc::new(PortfolioData::default()));
        assert!(render(&state, &ctx()).contains("Unable to Load Portfolio"));
    }

    #[test]
    fn ready_view_assembles_sections() {
        let state = LoadState::Ready(Arc::new(data()));
        let html = render(&state, &ctx());
        assert!(html.contains("<h1>Dr. Grace Hopper</h1>"));
        assert!(html.contains("Compilers &amp; languages."));
        assert!(html.contains(r#"<section id="awards""#));
        assert!(!html.contains(r#"<section id="patents""#));
        assert!(html.contains(r#"<section id="research""#));
        assert!(html.contains("Books Published"));
        assert!(html.contains("grace@uni.edu"));
        assert!(html.contains("&copy; 2026"));
        assert!(!html.contains("Message Sent!"));
    }

    #[test]
    fn rendering_is_idempotent() {
        let state = LoadState::Ready(Arc::new(data()));
        assert_eq!(render(&state, &ctx()), render(&state, &ctx()));
    }

    #[test]
    fn error_banner_offers_mailto() {
        let state = LoadState::Ready(Arc::new(data()));
        let ctx = ctx().with_banner(ContactBanner::failure("grace@uni.edu", "Hi", "Body"));
        let html = render(&state, &ctx);
        assert!(html.contains("Email Failed to Send"));
        assert!(html.contains("mailto:grace@uni.edu?subject"));
    }
}

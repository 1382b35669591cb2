//! Handlebars registry holding every HTML template used by the crate.

use handlebars::Handlebars;
use serde::Serialize;

use crate::error::PortfolioError;

pub const PAGE: &str = "page";
pub const HERO: &str = "hero";
pub const SECTION: &str = "section";
pub const SECTION_TABLE: &str = "section_table";
pub const SECTION_CARDS: &str = "section_cards";
pub const RESEARCH: &str = "research";
pub const CONTACT: &str = "contact";
pub const EMAIL: &str = "email";

const SOURCES: &[(&str, &str)] = &[
    (PAGE, include_str!("../templates/page.hbs")),
    (HERO, include_str!("../templates/hero.hbs")),
    (SECTION, include_str!("../templates/section.hbs")),
    (SECTION_TABLE, include_str!("../templates/section_table.hbs")),
    (SECTION_CARDS, include_str!("../templates/section_cards.hbs")),
    (RESEARCH, include_str!("../templates/research.hbs")),
    (CONTACT, include_str!("../templates/contact.hbs")),
    (EMAIL, include_str!("../templates/email.hbs")),
];

/// Compiled templates. Values are HTML-escaped on output.
pub struct Templates {
    handlebars: Handlebars<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, PortfolioError> {
        let mut handlebars = Handlebars::new();
        for (name, source) in SOURCES {
            handlebars.register_template_string(name, *source)?;
        }
        Ok(Self { handlebars })
    }

    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String, PortfolioError> {
        Ok(self.handlebars.render(name, data)?)
    }
}

/// Renders a single template that uses no partials, without building the
/// whole registry.
pub fn render_standalone<T: Serialize>(name: &str, data: &T) -> Result<String, PortfolioError> {
    let source = SOURCES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, source)| *source)
        .ok_or_else(|| PortfolioError::Template(format!("unknown template '{}'", name)))?;
    Ok(Handlebars::new().render_template(source, data)?)
}

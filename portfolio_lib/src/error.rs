//! Error types for the library layer.

use std::fmt;

/// Errors produced by the library layer, wrapping sheet client errors and
/// adding aggregation, configuration, template and input failures.
#[derive(Debug)]
pub enum PortfolioError {
    /// An error from the underlying sheets client.
    Sheets(sheets_api::Error),
    /// The fetch orchestration itself failed (not a single source).
    Aggregation(String),
    /// Configuration could not be read or is inconsistent.
    Config(String),
    /// An HTML template failed to compile or render.
    Template(String),
    /// User-provided input failed validation.
    InvalidInput(String),
}

impl fmt::Display for PortfolioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sheets(e) => write!(f, "Sheets error: {}", e),
            Self::Aggregation(msg) => write!(f, "Aggregation error: {}", msg),
            Self::Config(msg) => write!(f, "Config error: {}", msg),
            Self::Template(msg) => write!(f, "Template error: {}", msg),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for PortfolioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Sheets(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sheets_api::Error> for PortfolioError {
    fn from(e: sheets_api::Error) -> Self {
        Self::Sheets(e)
    }
}

impl From<handlebars::RenderError> for PortfolioError {
    fn from(e: handlebars::RenderError) -> Self {
        Self::Template(e.to_string())
    }
}

impl From<handlebars::TemplateError> for PortfolioError {
    fn from(e: handlebars::TemplateError) -> Self {
        Self::Template(e.to_string())
    }
}

impl From<toml::de::Error> for PortfolioError {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}

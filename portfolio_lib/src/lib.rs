//! Library layer for the portfolio site: loads the published sheets,
//! renders the page, and relays contact-form messages.
//!
//! Wraps the `sheets_api` crate with field-alias normalization, a one-shot
//! concurrent aggregator, the generic and dedicated section renderers, and
//! the Resend / FormSubmit contact relay.

pub mod aggregate;
pub mod config;
pub mod contact;
pub mod error;
pub mod normalize;
pub mod page;
pub mod profile;
pub mod render;
pub mod section;
pub mod select;
pub mod templates;

pub use sheets_api;
pub use sheets_api::Record;

pub use aggregate::{Aggregator, LoadState, PortfolioData, PortfolioStore};
pub use config::PortfolioConfig;
pub use error::PortfolioError;
pub use page::{render_page, PageContext};
pub use render::SectionView;
pub use section::{Section, SourceRegistry};
pub use templates::Templates;

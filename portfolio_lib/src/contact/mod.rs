//! Contact-form relay with two independent fallback layers.
//!
//! - [`relay::Relay`] runs behind the HTTP endpoint and picks Resend or
//!   FormSubmit once per deployment, based on whether an API key exists.
//! - [`client::ContactClient`] calls that endpoint and, if it is down or
//!   answers with an error, posts straight to FormSubmit.

pub mod client;
pub mod error;
pub mod form;
pub mod formsubmit;
pub mod relay;
pub mod resend;
pub mod types;

pub use client::{ContactClient, Delivery};
pub use error::{ContactError, RelayError};
pub use form::{ContactForm, ContactStatus};
pub use formsubmit::FormSubmitClient;
pub use relay::{ProviderSelection, Relay};
pub use resend::ResendClient;
pub use types::{ContactSubmission, RelayMethod, RelayResponse};

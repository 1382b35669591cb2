//! Client for published spreadsheets exported as CSV, plus the row
//! normalizer that turns an export into header-keyed records.

mod client;
mod errors;
pub mod rows;

pub use self::client::Client;
pub use self::errors::Error;
pub use self::rows::{parse_rows, Record};

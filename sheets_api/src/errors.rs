//! Error types for the sheets client.

/// Errors that can occur when fetching or parsing a published sheet.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An HTTP request failed (network error, timeout, or invalid URL).
    #[error("Request failed")]
    RequestFailed,
    /// The export endpoint returned a non-success status with a body snippet.
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// The downloaded text could not be read as delimited rows.
    #[error("Failed to parse sheet: {0}")]
    Parse(String),
}

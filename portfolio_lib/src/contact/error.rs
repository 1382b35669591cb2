//! Error types for contact delivery.

use thiserror::Error;

use super::types::RelayResponse;

/// Shown to the visitor whenever a provider call fails.
pub const FAILURE_HINT: &str =
    "If using FormSubmit, make sure to activate it for your new domain by checking your inbox.";

/// Errors from the server-side relay.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    /// Resend rejected the message; carries its error payload.
    #[error("Resend API error: {0}")]
    Primary(String),
    #[error("FormSubmit failed")]
    FallbackFailed,
    #[error("Failed to build email: {0}")]
    Template(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl RelayError {
    /// HTTP status the relay endpoint answers with.
    pub fn status_code(&self) -> u16 {
        match self {
            RelayError::MissingFields(_) => 400,
            _ => 500,
        }
    }

    /// JSON body the relay endpoint answers with.
    pub fn to_response(&self) -> RelayResponse {
        match self {
            RelayError::MissingFields(_) => RelayResponse::failure("Missing required fields"),
            other => RelayResponse::Failure {
                error: "Failed to send email".to_string(),
                message: Some(other.to_string()),
                hint: Some(FAILURE_HINT.to_string()),
            },
        }
    }
}

/// Errors from the caller side of a submission.
#[derive(Error, Debug)]
pub enum ContactError {
    #[error("Missing required fields: {}", .0.join(", "))]
    Incomplete(Vec<&'static str>),
    #[error("Both API and FormSubmit failed")]
    BothFailed { relay: String, fallback: String },
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_maps_to_400_without_hint() {
        let err = RelayError::MissingFields(vec!["message"]);
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), "Missing required fields: message");
        assert_eq!(
            err.to_response(),
            RelayResponse::failure("Missing required fields")
        );
    }

    #[test]
    fn provider_errors_map_to_500_with_hint() {
        let err = RelayError::Primary(r#"{"message":"invalid from"}"#.to_string());
        assert_eq!(err.status_code(), 500);
        match err.to_response() {
            RelayResponse::Failure {
                error,
                message,
                hint,
            } => {
                assert_eq!(error, "Failed to send email");
                assert!(message.unwrap().contains("invalid from"));
                assert_eq!(hint.as_deref(), Some(FAILURE_HINT));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn fallback_failure_message() {
        let err = RelayError::FallbackFailed;
        assert_eq!(err.to_string(), "FormSubmit failed");
        assert_eq!(err.status_code(), 500);
    }
}

//! Server-side relay: validates a submission and hands it to the single
//! provider selected for this deployment.

use super::error::RelayError;
use super::formsubmit::{FormSubmitClient, DEFAULT_REFERER};
use super::resend::ResendClient;
use super::types::{ContactSubmission, RelayMethod, RelayResponse};

/// The provider chosen once at startup. A configured Resend key selects the
/// primary; otherwise every message goes through FormSubmit.
pub enum ProviderSelection {
    Primary(ResendClient),
    Fallback(FormSubmitClient),
}

impl ProviderSelection {
    pub fn method(&self) -> RelayMethod {
        match self {
            ProviderSelection::Primary(_) => RelayMethod::Resend,
            ProviderSelection::Fallback(_) => RelayMethod::FormSubmit,
        }
    }
}

pub struct Relay {
    selection: ProviderSelection,
}

impl Relay {
    pub fn new(selection: ProviderSelection) -> Self {
        Self { selection }
    }

    pub fn method(&self) -> RelayMethod {
        self.selection.method()
    }

    /// Delivers one submission. Validation runs before any provider call, and
    /// a primary failure is returned as is without trying FormSubmit.
    pub async fn handle(
        &self,
        submission: &ContactSubmission,
        referer: Option<&str>,
    ) -> Result<RelayMethod, RelayError> {
        let missing = submission.missing_relay_fields();
        if !missing.is_empty() {
            tracing::warn!("Rejecting submission, missing fields: {}", missing.join(", "));
            return Err(RelayError::MissingFields(missing));
        }

        let method = self.method();
        tracing::info!(
            "Attempting to send email to {} via {}",
            submission.target_email,
            method
        );

        match &self.selection {
            ProviderSelection::Primary(resend) => resend.send(submission).await?,
            ProviderSelection::Fallback(formsubmit) => {
                formsubmit
                    .send(submission, Some(referer.unwrap_or(DEFAULT_REFERER)))
                    .await?
            }
        }

        tracing::info!("Email sent via {}", method);
        Ok(method)
    }

    /// Status code and JSON body for the relay endpoint.
    pub async fn respond(
        &self,
        submission: &ContactSubmission,
        referer: Option<&str>,
    ) -> (u16, RelayResponse) {
        match self.handle(submission, referer).await {
            Ok(method) => (200, RelayResponse::success(method)),
            Err(e) => {
                tracing::error!("Email relay failed: {}", e);
                (e.status_code(), e.to_response())
            }
        }
    }
}

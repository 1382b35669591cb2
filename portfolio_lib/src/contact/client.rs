//! Caller side of a submission: try the relay endpoint, and when it cannot
//! deliver, post straight to FormSubmit.

use std::time::Duration;

use super::error::ContactError;
use super::formsubmit::FormSubmitClient;
use super::types::ContactSubmission;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How a submission reached the recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    ViaRelay,
    DirectFallback,
}

pub struct ContactClient {
    client: reqwest::Client,
    relay_url: String,
    formsubmit: FormSubmitClient,
}

impl ContactClient {
    pub fn new(relay_url: &str, formsubmit: FormSubmitClient) -> Result<Self, ContactError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            relay_url: relay_url.to_string(),
            formsubmit,
        })
    }

    pub fn relay_url(&self) -> &str {
        &self.relay_url
    }

    /// Submits through the relay, falling back to a direct FormSubmit post
    /// on a non-2xx answer or transport error. At most two requests.
    pub async fn submit(&self, submission: &ContactSubmission) -> Result<Delivery, ContactError> {
        let missing = submission.missing_form_fields();
        if !missing.is_empty() {
            return Err(ContactError::Incomplete(missing));
        }

        let relay_failure = match self.post_relay(submission).await {
            Ok(()) => return Ok(Delivery::ViaRelay),
            Err(reason) => reason,
        };
        tracing::warn!(
            "Relay at {} failed ({}), trying FormSubmit directly",
            self.relay_url,
            relay_failure
        );

        match self.formsubmit.send(submission, None).await {
            Ok(()) => Ok(Delivery::DirectFallback),
            Err(e) => {
                tracing::error!("Direct FormSubmit also failed: {}", e);
                Err(ContactError::BothFailed {
                    relay: relay_failure,
                    fallback: e.to_string(),
                })
            }
        }
    }

    async fn post_relay(&self, submission: &ContactSubmission) -> Result<(), String> {
        let response = self
            .client
            .post(&self.relay_url)
            .json(submission)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(format!("HTTP {}: {}", status.as_u16(), body))
        }
    }
}

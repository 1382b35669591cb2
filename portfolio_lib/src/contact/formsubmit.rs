//! FormSubmit AJAX endpoint client (fallback provider).

use std::time::Duration;

use serde::Serialize;
use url::Url;

use super::error::RelayError;
use super::types::ContactSubmission;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_BASE_URL: &str = "https://formsubmit.co";

/// Referer sent by the relay when the caller supplied none.
pub const DEFAULT_REFERER: &str = "https://formsubmit.co";

#[derive(Debug, Serialize)]
struct FormSubmitPayload<'a> {
    name: &'a str,
    email: &'a str,
    subject: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    purpose: Option<&'a str>,
    message: &'a str,
    #[serde(rename = "_subject")]
    mail_subject: String,
    #[serde(rename = "_template")]
    template: &'static str,
}

impl<'a> FormSubmitPayload<'a> {
    fn from_submission(submission: &'a ContactSubmission) -> Self {
        Self {
            name: &submission.name,
            email: &submission.email,
            subject: &submission.subject,
            purpose: submission.purpose.as_deref(),
            message: &submission.message,
            mail_subject: submission.mail_subject(),
            template: "table",
        }
    }
}

pub struct FormSubmitClient {
    client: reqwest::Client,
    base_url: String,
}

impl FormSubmitClient {
    pub fn new() -> Result<Self, RelayError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a new FormSubmitClient with custom base URL (for testing with wiremock).
    pub fn with_base_url(base_url: &str) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `{base}/ajax/<target>`, with the address percent-encoded as a path segment.
    pub fn endpoint(&self, target_email: &str) -> Result<Url, RelayError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            tracing::error!("Invalid FormSubmit base URL {}: {}", self.base_url, e);
            RelayError::FallbackFailed
        })?;
        url.path_segments_mut()
            .map_err(|_| RelayError::FallbackFailed)?
            .pop_if_empty()
            .push("ajax")
            .push(target_email);
        Ok(url)
    }

    /// Posts the submission to the target's FormSubmit inbox. `referer` is
    /// only sent when given.
    pub async fn send(
        &self,
        submission: &ContactSubmission,
        referer: Option<&str>,
    ) -> Result<(), RelayError> {
        let url = self.endpoint(&submission.target_email)?;
        let mut request = self
            .client
            .post(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&FormSubmitPayload::from_submission(submission));
        if let Some(referer) = referer {
            request = request.header(reqwest::header::REFERER, referer);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::error!("FormSubmit returned status {}", status);
            return Err(RelayError::FallbackFailed);
        }
        Ok(())
    }
}

//! Resend transactional-email client (primary provider).

use std::time::Duration;

use serde::Serialize;

use super::error::RelayError;
use super::types::ContactSubmission;
use crate::templates;

/// Request timeout for Resend API calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_BASE_URL: &str = "https://api.resend.com";
pub const DEFAULT_SENDER: &str = "Portfolio Contact <onboarding@resend.dev>";

/// Body of `POST /emails`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResendEmail {
    pub from: String,
    pub to: Vec<String>,
    pub reply_to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Serialize)]
struct EmailView<'a> {
    name: &'a str,
    email: &'a str,
    subject: &'a str,
    purpose: &'a str,
    message: &'a str,
}

/// Resend REST client authenticated with a bearer API key.
pub struct ResendClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    sender: String,
}

impl ResendClient {
    /// Create a new ResendClient with default base URL and sender.
    pub fn new(api_key: String) -> Result<Self, RelayError> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key)
    }

    /// Create a new ResendClient with custom base URL (for testing with wiremock).
    pub fn with_base_url(base_url: &str, api_key: String) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            sender: DEFAULT_SENDER.to_string(),
        })
    }

    pub fn with_sender(mut self, sender: &str) -> Self {
        self.sender = sender.to_string();
        self
    }

    /// Builds the outgoing message. User-supplied text is HTML-escaped.
    pub fn build_email(&self, submission: &ContactSubmission) -> Result<ResendEmail, RelayError> {
        let view = EmailView {
            name: &submission.name,
            email: &submission.email,
            subject: &submission.subject,
            purpose: submission.purpose_label(),
            message: &submission.message,
        };
        let html = templates::render_standalone(templates::EMAIL, &view)
            .map_err(|e| RelayError::Template(e.to_string()))?;
        Ok(ResendEmail {
            from: self.sender.clone(),
            to: vec![submission.target_email.clone()],
            reply_to: submission.email.clone(),
            subject: submission.mail_subject(),
            html,
        })
    }

    /// Sends the submission. A non-2xx answer becomes
    /// [`RelayError::Primary`] carrying Resend's error payload.
    pub async fn send(&self, submission: &ContactSubmission) -> Result<(), RelayError> {
        let email = self.build_email(submission)?;
        let response = self
            .client
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&email)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            let payload = serde_json::from_str::<serde_json::Value>(&body)
                .map(|v| v.to_string())
                .unwrap_or(body);
            tracing::error!("Resend rejected message with status {}: {}", status, payload);
            return Err(RelayError::Primary(payload));
        }

        Ok(())
    }
}

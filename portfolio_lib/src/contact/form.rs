//! Submission status for the input form, plus the `mailto:` escape hatch
//! offered when delivery fails.

use std::time::{Duration, Instant};

use super::types::ContactSubmission;

/// How long a success or error outcome is shown before the form resets.
pub const DISPLAY_WINDOW: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactStatus {
    Idle,
    Submitting,
    Success,
    Error,
}

/// `Idle -> Submitting -> Success | Error -> Idle` after [`DISPLAY_WINDOW`].
#[derive(Debug, Clone)]
pub struct ContactForm {
    status: ContactStatus,
    settled_at: Option<Instant>,
    mailto: Option<String>,
}

impl Default for ContactForm {
    fn default() -> Self {
        Self::new()
    }
}

impl ContactForm {
    pub fn new() -> Self {
        Self {
            status: ContactStatus::Idle,
            settled_at: None,
            mailto: None,
        }
    }

    /// Moves to `Submitting` when the form is idle and complete. Returns the
    /// missing fields otherwise and leaves the status untouched.
    pub fn begin_submit(
        &mut self,
        submission: &ContactSubmission,
        now: Instant,
    ) -> Result<(), Vec<&'static str>> {
        if self.status_at(now) != ContactStatus::Idle {
            return Err(Vec::new());
        }
        let missing = submission.missing_form_fields();
        if !missing.is_empty() {
            return Err(missing);
        }
        self.status = ContactStatus::Submitting;
        self.settled_at = None;
        self.mailto = Some(mailto_link(
            &submission.target_email,
            &submission.subject,
            &submission.message,
        ));
        Ok(())
    }

    /// Records the outcome of an in-flight submission.
    pub fn finish(&mut self, delivered: bool, now: Instant) {
        if self.status != ContactStatus::Submitting {
            return;
        }
        self.status = if delivered {
            ContactStatus::Success
        } else {
            ContactStatus::Error
        };
        self.settled_at = Some(now);
    }

    pub fn status_at(&self, now: Instant) -> ContactStatus {
        match (self.status, self.settled_at) {
            (ContactStatus::Success | ContactStatus::Error, Some(at))
                if now.saturating_duration_since(at) >= DISPLAY_WINDOW =>
            {
                ContactStatus::Idle
            }
            (status, _) => status,
        }
    }

    /// Time until a shown outcome resets to `Idle`.
    pub fn time_left(&self, now: Instant) -> Option<Duration> {
        match self.status_at(now) {
            ContactStatus::Success | ContactStatus::Error => self
                .settled_at
                .map(|at| DISPLAY_WINDOW.saturating_sub(now.saturating_duration_since(at))),
            _ => None,
        }
    }

    /// Prefilled `mailto:` for the last submission, while its error shows.
    pub fn failure_mailto(&self, now: Instant) -> Option<&str> {
        match self.status_at(now) {
            ContactStatus::Error => self.mailto.as_deref(),
            _ => None,
        }
    }
}

fn encode_component(value: &str) -> String {
    // form_urlencoded writes spaces as '+' and escapes a literal '+'.
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// `mailto:` link prefilled with the subject and message.
pub fn mailto_link(target: &str, subject: &str, message: &str) -> String {
    format!(
        "mailto:{}?subject={}&body={}",
        target,
        encode_component(subject),
        encode_component(message)
    )
}

//! Wire types shared by the relay endpoint and its callers.

use serde::{Deserialize, Deserializer, Serialize};

/// Choices offered by the purpose drop-down.
pub const PURPOSES: [&str; 5] = [
    "Academic Query",
    "Research Collaboration",
    "Student Guidance",
    "Conference/Journal",
    "Administrative",
];

/// A contact-form submission, as posted to the relay endpoint.
///
/// Missing or `null` JSON fields deserialize as empty so that presence
/// validation, not the parser, reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactSubmission {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(deserialize_with = "null_as_default")]
    pub target_email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub consent: bool,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ContactSubmission {
    /// Fields the relay requires, reported by their JSON names.
    pub fn missing_relay_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("subject", &self.subject),
            ("message", &self.message),
            ("targetEmail", &self.target_email),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
        .collect()
    }

    /// Fields the input form requires before it will submit.
    pub fn missing_form_fields(&self) -> Vec<&'static str> {
        let mut missing: Vec<&'static str> = [
            ("name", &self.name),
            ("email", &self.email),
            ("subject", &self.subject),
            ("message", &self.message),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
        .collect();
        if !self.consent {
            missing.push("consent");
        }
        missing
    }

    /// Purpose for display; blank or unset shows as "Not specified".
    pub fn purpose_label(&self) -> &str {
        self.purpose
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or("Not specified")
    }

    /// Subject line used for outgoing mail.
    pub fn mail_subject(&self) -> String {
        format!("Portfolio Contact: {}", self.subject)
    }
}

/// Which provider delivered the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayMethod {
    Resend,
    FormSubmit,
}

impl RelayMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            RelayMethod::Resend => "resend",
            RelayMethod::FormSubmit => "formsubmit",
        }
    }
}

impl std::fmt::Display for RelayMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON body returned by the relay endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelayResponse {
    Success {
        success: bool,
        method: RelayMethod,
    },
    Failure {
        error: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        hint: Option<String>,
    },
}

impl RelayResponse {
    pub fn success(method: RelayMethod) -> Self {
        RelayResponse::Success {
            success: true,
            method,
        }
    }

    pub fn failure(error: &str) -> Self {
        RelayResponse::Failure {
            error: error.to_string(),
            message: None,
            hint: None,
        }
    }
}

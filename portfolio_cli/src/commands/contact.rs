//! The `contact` subcommand: submits a message through the relay, falling
//! back to FormSubmit directly.

use std::time::Instant;

use anyhow::{bail, Result};
use clap::Args;
use portfolio_lib::contact::{ContactClient, ContactForm, ContactSubmission, Delivery};
use portfolio_lib::PortfolioConfig;

use crate::output::{print_json, OutputFormat};

#[derive(Args)]
pub struct ContactArgs {
    /// Your name
    #[arg(long)]
    pub name: String,

    /// Your email address (used as reply-to)
    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub subject: String,

    /// Academic Query, Research Collaboration, Student Guidance,
    /// Conference/Journal or Administrative
    #[arg(long)]
    pub purpose: Option<String>,

    #[arg(long)]
    pub message: String,

    /// Recipient (defaults to the configured fallback address)
    #[arg(long)]
    pub to: Option<String>,

    /// Agree to be contacted about this message
    #[arg(long)]
    pub consent: bool,
}

impl ContactArgs {
    fn submission(&self, fallback_email: &str) -> ContactSubmission {
        ContactSubmission {
            name: self.name.clone(),
            email: self.email.clone(),
            subject: self.subject.clone(),
            purpose: self.purpose.clone().filter(|p| !p.is_empty()),
            message: self.message.clone(),
            target_email: self.to.clone().unwrap_or_else(|| fallback_email.to_string()),
            consent: self.consent,
        }
    }
}

pub async fn run(args: &ContactArgs, config: &PortfolioConfig, format: &OutputFormat) -> Result<()> {
    let submission = args.submission(&config.fallback_email);
    let client = ContactClient::new(&config.relay_url(), config.formsubmit_client()?)?;

    let mut form = ContactForm::new();
    if let Err(missing) = form.begin_submit(&submission, Instant::now()) {
        bail!("missing required fields: {}", missing.join(", "));
    }
    let outcome = client.submit(&submission).await;
    form.finish(outcome.is_ok(), Instant::now());
    if let Some(mailto) = form.failure_mailto(Instant::now()) {
        eprintln!("You can email directly instead: {}", mailto);
    }
    let delivery = outcome?;
    let via = match delivery {
        Delivery::ViaRelay => "relay",
        Delivery::DirectFallback => "formsubmit",
    };
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "success": true,
            "to": submission.target_email,
            "via": via,
        })),
        _ => println!("Message sent to {} via {}", submission.target_email, via),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ContactArgs {
        ContactArgs {
            name: "Ada".into(),
            email: "ada@example.org".into(),
            subject: "Hi".into(),
            purpose: Some(String::new()),
            message: "Hello".into(),
            to: None,
            consent: true,
        }
    }

    #[test]
    fn submission_defaults_recipient() {
        let sub = args().submission("fallback@uni.edu");
        assert_eq!(sub.target_email, "fallback@uni.edu");
        assert_eq!(sub.purpose, None);
        assert!(sub.missing_form_fields().is_empty());
    }

    #[test]
    fn missing_consent_blocks_the_form() {
        let mut args = args();
        args.consent = false;
        let mut form = ContactForm::new();
        let result = form.begin_submit(&args.submission("fallback@uni.edu"), Instant::now());
        assert_eq!(result, Err(vec!["consent"]));
    }

    #[test]
    fn explicit_recipient_wins() {
        let mut args = args();
        args.to = Some("prof@uni.edu".into());
        assert_eq!(args.submission("fallback@uni.edu").target_email, "prof@uni.edu");
    }
}

//! Deployment configuration: an optional TOML file overlaid by environment
//! variables.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::contact::{FormSubmitClient, ProviderSelection, RelayError, ResendClient};
use crate::error::PortfolioError;
use crate::section::{Section, SourceRegistry};

pub const DEFAULT_SHEETS_BASE_URL: &str = "https://docs.google.com";
pub const DEFAULT_FALLBACK_EMAIL: &str = "mohitkonduri@example.com";
pub const DEFAULT_PORT: u16 = 3000;

pub const ENV_RESEND_API_KEY: &str = "RESEND_API_KEY";
pub const ENV_PORT: &str = "PORT";
pub const ENV_RELAY_URL: &str = "PORTFOLIO_RELAY_URL";
pub const ENV_FALLBACK_EMAIL: &str = "PORTFOLIO_FALLBACK_EMAIL";

/// Shape of the TOML file. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub sheets_base_url: Option<String>,
    pub resend_base_url: Option<String>,
    pub formsubmit_base_url: Option<String>,
    pub sender: Option<String>,
    pub fallback_email: Option<String>,
    pub relay_url: Option<String>,
    pub port: Option<u16>,
    #[serde(default)]
    pub sheets: BTreeMap<String, String>,
}

impl FileConfig {
    pub fn parse(source: &str) -> Result<Self, PortfolioError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, PortfolioError> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            PortfolioError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&source)
    }
}

/// Resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioConfig {
    pub sheets_base_url: String,
    pub resend_base_url: String,
    pub formsubmit_base_url: String,
    pub sender: String,
    pub fallback_email: String,
    pub resend_api_key: Option<String>,
    pub port: u16,
    relay_url: Option<String>,
    pub sheet_overrides: BTreeMap<Section, String>,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            sheets_base_url: DEFAULT_SHEETS_BASE_URL.to_string(),
            resend_base_url: crate::contact::resend::DEFAULT_BASE_URL.to_string(),
            formsubmit_base_url: crate::contact::formsubmit::DEFAULT_BASE_URL.to_string(),
            sender: crate::contact::resend::DEFAULT_SENDER.to_string(),
            fallback_email: DEFAULT_FALLBACK_EMAIL.to_string(),
            resend_api_key: None,
            port: DEFAULT_PORT,
            relay_url: None,
            sheet_overrides: BTreeMap::new(),
        }
    }
}

impl PortfolioConfig {
    /// Reads the optional file, then applies process environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, PortfolioError> {
        let file = match path {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Merges file values and environment lookups over the defaults.
    pub fn resolve<F>(file: FileConfig, env: F) -> Result<Self, PortfolioError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let mut sheet_overrides = BTreeMap::new();
        for (key, id) in file.sheets {
            let section: Section = key
                .parse()
                .map_err(|_| PortfolioError::Config(format!("unknown section '{}' in [sheets]", key)))?;
            if id.trim().is_empty() {
                return Err(PortfolioError::Config(format!("empty sheet id for '{}'", key)));
            }
            sheet_overrides.insert(section, id);
        }

        let port = match env(ENV_PORT) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| PortfolioError::Config(format!("invalid {}: '{}'", ENV_PORT, raw)))?,
            None => file.port.unwrap_or(defaults.port),
        };

        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            sheets_base_url: file.sheets_base_url.unwrap_or(defaults.sheets_base_url),
            resend_base_url: file.resend_base_url.unwrap_or(defaults.resend_base_url),
            formsubmit_base_url: file
                .formsubmit_base_url
                .unwrap_or(defaults.formsubmit_base_url),
            sender: file.sender.unwrap_or(defaults.sender),
            fallback_email: non_empty(ENV_FALLBACK_EMAIL)
                .or(file.fallback_email)
                .unwrap_or(defaults.fallback_email),
            resend_api_key: non_empty(ENV_RESEND_API_KEY),
            port,
            relay_url: non_empty(ENV_RELAY_URL).or(file.relay_url),
            sheet_overrides,
        })
    }

    /// Relay endpoint used by the contact client. Defaults to this server.
    pub fn relay_url(&self) -> String {
        self.relay_url
            .clone()
            .unwrap_or_else(|| format!("http://127.0.0.1:{}/api/send-email", self.port))
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Default registry with per-section overrides applied.
    pub fn registry(&self) -> SourceRegistry {
        self.sheet_overrides
            .iter()
            .fold(SourceRegistry::default(), |registry, (section, id)| {
                registry.with_sheet_id(*section, id)
            })
    }

    pub fn sheets_client(&self) -> sheets_api::Client {
        sheets_api::Client::with_base_url(&self.sheets_base_url)
    }

    pub fn formsubmit_client(&self) -> Result<FormSubmitClient, RelayError> {
        FormSubmitClient::with_base_url(&self.formsubmit_base_url)
    }

    /// Static provider choice: Resend when a key is set, FormSubmit otherwise.
    pub fn selection(&self) -> Result<ProviderSelection, RelayError> {
        match &self.resend_api_key {
            Some(key) => Ok(ProviderSelection::Primary(
                ResendClient::with_base_url(&self.resend_base_url, key.clone())?
                    .with_sender(&self.sender),
            )),
            None => Ok(ProviderSelection::Fallback(self.formsubmit_client()?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::RelayMethod;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_file_or_env() {
        let config = PortfolioConfig::resolve(FileConfig::default(), env_from(&[])).unwrap();
        assert_eq!(config, PortfolioConfig::default());
        assert_eq!(config.relay_url(), "http://127.0.0.1:3000/api/send-email");
        assert_eq!(config.fallback_email, DEFAULT_FALLBACK_EMAIL);
    }

    #[test]
    fn file_values_and_sheet_overrides() {
        let file = FileConfig::parse(
            r#"
            port = 8080
            sender = "Lab <lab@uni.edu>"

            [sheets]
            books = "custom-books-id"
            "#,
        )
        .unwrap();
        let config = PortfolioConfig::resolve(file, env_from(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.sender, "Lab <lab@uni.edu>");
        assert_eq!(config.relay_url(), "http://127.0.0.1:8080/api/send-email");

        let registry = config.registry();
        assert_eq!(registry.sheet_id(Section::Books), Some("custom-books-id"));
        assert_eq!(
            registry.sheet_id(Section::Patents),
            Some(Section::Patents.default_sheet_id())
        );
    }

    #[test]
    fn unknown_section_rejected() {
        let file = FileConfig::parse("[sheets]\nblog = \"x\"\n").unwrap();
        let err = PortfolioConfig::resolve(file, env_from(&[])).unwrap_err();
        assert!(err.to_string().contains("unknown section 'blog'"));
    }

    #[test]
    fn unknown_top_level_key_rejected() {
        assert!(FileConfig::parse("colour = \"red\"\n").is_err());
    }

    #[test]
    fn env_overrides_file() {
        let file = FileConfig::parse("port = 8080\nfallback_email = \"file@uni.edu\"\n").unwrap();
        let config = PortfolioConfig::resolve(
            file,
            env_from(&[
                (ENV_PORT, "9000"),
                (ENV_FALLBACK_EMAIL, "env@uni.edu"),
                (ENV_RELAY_URL, "https://relay.example.org/api/send-email"),
            ]),
        )
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.fallback_email, "env@uni.edu");
        assert_eq!(config.relay_url(), "https://relay.example.org/api/send-email");
    }

    #[test]
    fn invalid_port_is_config_error() {
        let err = PortfolioConfig::resolve(FileConfig::default(), env_from(&[(ENV_PORT, "http")]))
            .unwrap_err();
        assert!(matches!(err, PortfolioError::Config(_)));
    }

    #[test]
    fn empty_api_key_selects_fallback() {
        let config =
            PortfolioConfig::resolve(FileConfig::default(), env_from(&[(ENV_RESEND_API_KEY, "")]))
                .unwrap();
        assert_eq!(config.resend_api_key, None);
        assert_eq!(config.selection().unwrap().method(), RelayMethod::FormSubmit);
    }

    #[test]
    fn api_key_selects_primary() {
        let config = PortfolioConfig::resolve(
            FileConfig::default(),
            env_from(&[(ENV_RESEND_API_KEY, "re_123")]),
        )
        .unwrap();
        assert_eq!(config.selection().unwrap().method(), RelayMethod::Resend);
    }
}

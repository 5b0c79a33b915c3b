//! Frontend configuration loaded via OrthoConfig.
//!
//! Every value can be set through `HOSPITAL_*` environment variables; unset
//! values fall back to the defaults below.

use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
const DEFAULT_DRUG_API_BASE_URL: &str = "https://api.fda.gov/drug";
const DEFAULT_STATE_DIR: &str = ".hospital-frontend";

/// A configured value could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// A URL setting did not parse.
    #[error("{setting} is not a valid URL ('{value}'): {message}")]
    InvalidUrl {
        /// Setting name.
        setting: &'static str,
        /// Configured value.
        value: String,
        /// Parser message.
        message: String,
    },
    /// A URL setting used a scheme other than HTTP(S).
    #[error("{setting} must use http or https, got '{scheme}'")]
    UnsupportedScheme {
        /// Setting name.
        setting: &'static str,
        /// Configured scheme.
        scheme: String,
    },
}

/// Settings for the frontend context and the console binary.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "HOSPITAL")]
pub struct FrontendSettings {
    /// Base URL of the REST backend.
    pub api_base_url: Option<String>,
    /// Base URL of the drug information API.
    pub drug_api_base_url: Option<String>,
    /// Optional drug API key; requests are anonymous without it.
    pub drug_api_key: Option<String>,
    /// Directory holding the persisted session entries.
    pub state_dir: Option<String>,
    /// Per-request timeout for both HTTP clients, in seconds.
    #[ortho_config(default = 30)]
    pub request_timeout_secs: u64,
}

impl FrontendSettings {
    /// REST backend base URL, falling back to the local default.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the configured value is not an HTTP(S)
    /// URL.
    pub fn api_base_url(&self) -> Result<Url, SettingsError> {
        parse_http_url(
            "api_base_url",
            self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL),
        )
    }

    /// Drug API base URL, falling back to the public endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the configured value is not an HTTP(S)
    /// URL.
    pub fn drug_api_base_url(&self) -> Result<Url, SettingsError> {
        parse_http_url(
            "drug_api_base_url",
            self.drug_api_base_url
                .as_deref()
                .unwrap_or(DEFAULT_DRUG_API_BASE_URL),
        )
    }

    /// Drug API key, if configured and not blank.
    #[must_use]
    pub fn drug_api_key(&self) -> Option<&str> {
        self.drug_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Session state directory, falling back to `.hospital-frontend`.
    #[must_use]
    pub fn state_dir(&self) -> Utf8PathBuf {
        Utf8PathBuf::from(self.state_dir.as_deref().unwrap_or(DEFAULT_STATE_DIR))
    }

    /// Request timeout; zero is raised to one second.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

fn parse_http_url(setting: &'static str, raw: &str) -> Result<Url, SettingsError> {
    let url = Url::parse(raw.trim()).map_err(|err| SettingsError::InvalidUrl {
        setting,
        value: raw.to_owned(),
        message: err.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(SettingsError::UnsupportedScheme {
            setting,
            scheme: other.to_owned(),
        }),
    }
}

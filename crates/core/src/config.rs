//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the authoring services
//! and API clients. Nothing in this crate reads process-wide environment variables while a
//! prescription is being edited; the `*_from_env_value` helpers take the raw value so binaries
//! decide where it comes from.

use crate::constants::{
    COMMON_COMPLAINTS, DEFAULT_API_BASE_URL, DEFAULT_API_TIMEOUT_SECS, DEFAULT_BRANDING,
};
use crate::{PrescriptionError, PrescriptionResult};
use std::time::Duration;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    api_base_url: String,
    request_timeout: Duration,
    complaint_vocabulary: Vec<String>,
    branding: Option<String>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(
        api_base_url: String,
        request_timeout: Duration,
        complaint_vocabulary: Vec<String>,
        branding: Option<String>,
    ) -> PrescriptionResult<Self> {
        let api_base_url = api_base_url.trim().trim_end_matches('/').to_string();
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(PrescriptionError::InvalidInput(format!(
                "api base url must start with http:// or https:// (got '{}')",
                api_base_url
            )));
        }

        if request_timeout.is_zero() {
            return Err(PrescriptionError::InvalidInput(
                "request timeout must be greater than zero".into(),
            ));
        }

        if complaint_vocabulary.is_empty() {
            return Err(PrescriptionError::InvalidInput(
                "complaint vocabulary cannot be empty".into(),
            ));
        }

        Ok(Self {
            api_base_url,
            request_timeout,
            complaint_vocabulary,
            branding,
        })
    }

    /// Build a configuration from raw environment values.
    ///
    /// Each argument is the value of the matching variable (`RX_API_URL`, `RX_API_TIMEOUT_SECS`,
    /// `RX_COMPLAINTS`, `RX_BRANDING`) or `None` when unset.
    pub fn from_env_values(
        api_url: Option<String>,
        timeout_secs: Option<String>,
        complaints: Option<String>,
        branding: Option<String>,
    ) -> PrescriptionResult<Self> {
        Self::new(
            api_base_url_from_env_value(api_url),
            request_timeout_from_env_value(timeout_secs)?,
            complaint_vocabulary_from_env_value(complaints),
            branding_from_env_value(branding),
        )
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn complaint_vocabulary(&self) -> &[String] {
        &self.complaint_vocabulary
    }

    pub fn branding(&self) -> Option<&str> {
        self.branding.as_deref()
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_API_TIMEOUT_SECS),
            complaint_vocabulary: default_complaint_vocabulary(),
            branding: Some(DEFAULT_BRANDING.to_string()),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn default_complaint_vocabulary() -> Vec<String> {
    COMMON_COMPLAINTS.iter().map(|c| c.to_string()).collect()
}

/// Parse the clinic API base URL. Unset or blank values resolve to the default.
pub fn api_base_url_from_env_value(value: Option<String>) -> String {
    non_blank(value).unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
}

/// Parse the request timeout in whole seconds.
pub fn request_timeout_from_env_value(value: Option<String>) -> PrescriptionResult<Duration> {
    let Some(raw) = non_blank(value) else {
        return Ok(Duration::from_secs(DEFAULT_API_TIMEOUT_SECS));
    };

    let secs = raw.parse::<u64>().map_err(|_| {
        PrescriptionError::InvalidInput(format!(
            "request timeout must be a whole number of seconds (got '{}')",
            raw
        ))
    })?;

    Ok(Duration::from_secs(secs))
}

/// Parse a comma-separated complaint vocabulary, ignoring blank items and duplicates.
pub fn complaint_vocabulary_from_env_value(value: Option<String>) -> Vec<String> {
    let Some(raw) = non_blank(value) else {
        return default_complaint_vocabulary();
    };

    let mut vocabulary: Vec<String> = Vec::new();
    for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !vocabulary.iter().any(|existing| existing == item) {
            vocabulary.push(item.to_string());
        }
    }

    if vocabulary.is_empty() {
        default_complaint_vocabulary()
    } else {
        vocabulary
    }
}

/// Parse the branding line. Unset keeps the default; an explicit `none` disables it.
pub fn branding_from_env_value(value: Option<String>) -> Option<String> {
    match value {
        None => Some(DEFAULT_BRANDING.to_string()),
        Some(v) if v.trim().eq_ignore_ascii_case("none") => None,
        Some(v) => non_blank(Some(v)),
    }
}

//! Settings validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: `&Settings → Result<(), Vec<SettingsError>>`
//! - A missing file or unreachable URL is not a settings error; sources are
//!   allowed to come and go at runtime

use thiserror::Error;

use crate::settings::schema::Settings;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("config URL {url:?} is not a valid URL: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("config URL {url:?} must use http or https")]
    UnsupportedScheme { url: String },

    #[error("fetch timeout must be at least one second")]
    ZeroFetchTimeout,
}

pub fn validate_settings(settings: &Settings) -> Result<(), Vec<SettingsError>> {
    let mut errors = Vec::new();

    if let Some(raw) = settings.url() {
        match url::Url::parse(raw) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            Ok(_) => errors.push(SettingsError::UnsupportedScheme {
                url: raw.to_string(),
            }),
            Err(e) => errors.push(SettingsError::InvalidUrl {
                url: raw.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    if settings.fetch_timeout_secs == 0 {
        errors.push(SettingsError::ZeroFetchTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

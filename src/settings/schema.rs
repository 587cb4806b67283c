//! Settings that tell the registry where to load configuration from.
//!
//! The same struct is filled from command-line flags and environment variables
//! (via `clap`) or deserialized from a host application's own config file.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};

/// Default location of the configuration payload.
pub const DEFAULT_FILE: &str = "./app.confy";

/// Reload period used when the configured one is missing or below one second.
pub const DEFAULT_INTERVAL_SECS: i64 = 60;

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Source and scheduling settings for a registry.
#[derive(Debug, Clone, Args, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Configuration file to load; an empty value disables the file source.
    #[arg(long = "config-file", env = "HOTCFG_FILE", default_value = DEFAULT_FILE)]
    pub file: Option<PathBuf>,

    /// URL to fetch configuration from; overrides the file when reachable.
    #[arg(long = "config-url", env = "HOTCFG_URL")]
    pub url: Option<String>,

    /// Reload interval in seconds.
    #[arg(long = "interval", env = "HOTCFG_INTERVAL", default_value_t = DEFAULT_INTERVAL_SECS)]
    pub interval_secs: i64,

    /// Disable the default log sink.
    #[arg(long = "no-log", env = "HOTCFG_NOLOG")]
    pub no_log: bool,

    /// Timeout in seconds for fetching the URL source.
    #[arg(long = "fetch-timeout", env = "HOTCFG_FETCH_TIMEOUT", default_value_t = DEFAULT_FETCH_TIMEOUT_SECS)]
    pub fetch_timeout_secs: u64,

    /// Encoding of the configuration payload.
    #[arg(long = "format", env = "HOTCFG_FORMAT", value_enum, default_value_t = PayloadFormat::Json)]
    pub format: PayloadFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            file: Some(PathBuf::from(DEFAULT_FILE)),
            url: None,
            interval_secs: DEFAULT_INTERVAL_SECS,
            no_log: false,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            format: PayloadFormat::Json,
        }
    }
}

impl Settings {
    /// Settings with no sources at all: only defined defaults are served.
    pub fn detached() -> Self {
        Self {
            file: None,
            ..Self::default()
        }
    }

    /// File source, with empty paths treated as unset.
    pub fn file_path(&self) -> Option<&PathBuf> {
        self.file.as_ref().filter(|p| !p.as_os_str().is_empty())
    }

    /// URL source, with empty strings treated as unset.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.is_empty())
    }

    /// The scheduler period; anything under one second falls back to the default.
    pub fn reload_interval(&self) -> Duration {
        let secs = if self.interval_secs >= 1 {
            self.interval_secs
        } else {
            DEFAULT_INTERVAL_SECS
        };
        Duration::from_secs(secs as u64)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Document format of the configuration payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadFormat {
    #[default]
    Json,
    Toml,
}

//! Fetching raw configuration bytes.
//!
//! # Responsibilities
//! - Read the configured file
//! - GET the configured URL (bounded by the fetch timeout)
//! - Pick the candidate payload: URL wins over file when both succeed
//!
//! Failures here are expected in normal operation (a sidecar that is not up
//! yet, a file that has not been mounted) and are reported, never raised.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::observability::logging::Logger;
use crate::observability::metrics;
use crate::settings::Settings;

/// Transport failure while fetching a payload.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("status code:{status} from {url}")]
    Status { url: String, status: u16 },
}

/// Fetches payload bytes from the configured file and URL.
#[derive(Debug, Clone)]
pub struct SourceLoader {
    file: Option<PathBuf>,
    url: Option<String>,
    client: reqwest::Client,
}

impl SourceLoader {
    pub fn new(settings: &Settings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(settings.fetch_timeout())
            .build()?;

        Ok(Self {
            file: settings.file_path().cloned(),
            url: settings.url().map(str::to_string),
            client,
        })
    }

    /// Load the candidate payload, or `None` if no source produced bytes.
    pub async fn load(&self, log: &Logger) -> Option<Vec<u8>> {
        let mut data = None;

        if let Some(path) = &self.file {
            match load_from_file(path).await {
                Ok(bytes) => {
                    log.log(format_args!("file loaded[{}] ({})", bytes.len(), path.display()));
                    data = Some(bytes);
                }
                Err(e) => {
                    metrics::record_source_failure("file");
                    log.log(format_args!("file missing: {e}"));
                }
            }
        }

        if let Some(url) = &self.url {
            match load_from_url(&self.client, url).await {
                Ok(bytes) => {
                    log.log(format_args!("url loaded[{}] ({url})", bytes.len()));
                    data = Some(bytes);
                }
                Err(e) => {
                    metrics::record_source_failure("url");
                    log.log(format_args!("url missing: {e}"));
                }
            }
        }

        data
    }
}

pub async fn load_from_file(path: &Path) -> Result<Vec<u8>, SourceError> {
    tokio::fs::read(path).await.map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub async fn load_from_url(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, SourceError> {
    let http_err = |source: reqwest::Error| SourceError::Http {
        url: url.to_string(),
        source,
    };

    let response = client.get(url).send().await.map_err(http_err)?;
    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(SourceError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await.map_err(http_err)?;
    Ok(body.to_vec())
}

//! Error types shared across the registry.

use thiserror::Error;

use crate::registry::value::Kind;
use crate::settings::validation::SettingsError;

/// Errors that stop the registry from honouring a request.
///
/// Every variant corresponds to a condition that must not be papered over:
/// misuse of the registry or a configuration payload that cannot be trusted.
/// Transport failures are not represented here; see [`SourceError`](crate::reload::loader::SourceError).
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A name was declared twice.
    #[error("duplicate config definition: {name}")]
    Duplicate { name: String },

    /// A write disagrees with the kind already fixed for a name.
    #[error("config kind mismatch for {name}: expected {expected}, got {actual} ({value})")]
    KindMismatch {
        name: String,
        expected: Kind,
        actual: Kind,
        value: String,
    },

    /// The name was never defined nor loaded.
    #[error("config missing: {0}")]
    Missing(String),

    /// A typed getter was called for a name of another kind.
    #[error("unexpected type for {name}: requested {requested}, stored {stored}")]
    UnexpectedType {
        name: String,
        requested: Kind,
        stored: Kind,
    },

    /// Stored or incoming text cannot be read as the required kind.
    #[error("cannot parse {input:?} as {kind} for {name}: {reason}")]
    Parse {
        name: String,
        kind: Kind,
        input: String,
        reason: String,
    },

    /// The payload is not a flat mapping of scalars.
    #[error("parsing config data failed: {0}")]
    Decode(String),

    /// Settings rejected at construction time.
    #[error("invalid settings: {}", join(.0))]
    Settings(Vec<SettingsError>),

    /// The HTTP client for the URL source could not be created.
    #[error("cannot create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The background reload task ended abnormally.
    #[error("reload scheduler failed: {0}")]
    Scheduler(String),
}

fn join(errors: &[SettingsError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

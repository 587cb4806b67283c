//! Registry settings.
//!
//! # Data Flow
//! ```text
//! flags / environment (clap)  or  host config file (serde)
//!     → schema.rs (Settings, defaults)
//!     → validation.rs (semantic checks)
//!     → RegistryBuilder::build
//! ```
//!
//! # Design Decisions
//! - Every field has a default so an empty set of flags is valid
//! - An interval below one second silently falls back to 60 seconds

pub mod schema;
pub mod validation;

pub use schema::{PayloadFormat, Settings};
pub use validation::{validate_settings, SettingsError};

//! Typed, hot-reloading configuration registry.
//!
//! Applications declare every setting with a default, then read it through
//! typed getters. A background task periodically reloads a flat payload from
//! a file and/or URL and merges it into the registry.
//!
//! ```no_run
//! use hotcfg::{Registry, Settings};
//!
//! # async fn run() -> hotcfg::Result<()> {
//! let registry = Registry::builder(Settings::default()).build()?;
//! registry.define("http.host", "127.0.0.1")?;
//! registry.define("http.port", 2009)?;
//! registry.ready().await?;
//!
//! let port = registry.int("http.port")?;
//! # let _ = port;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod registry;
pub mod reload;
pub mod settings;

pub use error::{RegistryError, Result};
pub use registry::{Kind, Registry, RegistryBuilder, Snapshot, Value};
pub use settings::{PayloadFormat, Settings};

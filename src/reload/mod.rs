//! Reload subsystem.
//!
//! # Data Flow
//! ```text
//! Scheduler tick / ready()
//!     → loader.rs (file bytes, then URL bytes; URL wins)
//!     → signature.rs (SHA-256; unchanged payloads stop here)
//!     → decode.rs (flat name → scalar mapping)
//!     → Store::merge (kind checks, then writes)
//!     → completion callback (full snapshot)
//! ```
//!
//! # Design Decisions
//! - Transport failures are logged and skipped; decode and kind failures are errors
//! - Fetch and decode run outside the store's mutation lock
//! - The callback fires on every attempt, with an empty snapshot when nothing applied

pub mod decode;
pub mod loader;
pub mod pipeline;
pub mod signature;

pub use loader::{SourceError, SourceLoader};
pub use pipeline::{ReloadHandler, ReloadPipeline};
pub use signature::Signature;

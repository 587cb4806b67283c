//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Registry::ready():
//!     stop previous scheduler → reload once (awaited) → start scheduler
//!
//! Scheduler (scheduler.rs):
//!     tick every period → reload → next tick
//!     stop signal / registry dropped → exit loop
//!     fatal reload error → exit loop with the error
//! ```
//!
//! # Design Decisions
//! - First tick fires one period after start; ready() has just reloaded
//! - Ticks never overlap: each reload is awaited before the next tick
//! - In-flight reloads are never interrupted; stop takes effect between ticks

pub mod scheduler;

pub use scheduler::Scheduler;

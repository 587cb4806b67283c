//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! registry / reload pipeline
//!     → logging.rs (log sink lines: NEW/DEF/IGN/SET, source failures, fatal errors)
//!     → metrics.rs (reload outcomes, entry count)
//!
//! Consumers:
//!     → tracing subscriber (default sink) or an injected callback
//!     → Prometheus scrape (daemon binary, optional)
//! ```

pub mod logging;
pub mod metrics;

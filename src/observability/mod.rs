//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Façade, adapters, chain client and key service produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields (wallet kind, tx hash, request id) on every event
//! - Key material and signatures are never logged

pub mod logging;
pub mod metrics;

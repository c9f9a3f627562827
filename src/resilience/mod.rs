//! Resilience helpers.
//!
//! # Data Flow
//! ```text
//! Settlement polling:
//!     → backoff.rs (jittered exponential delay between polls)
//! Chain RPC:
//!     → per-call timeouts and endpoint failover (chain::client)
//! ```

pub mod backoff;

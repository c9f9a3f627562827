//! Key service HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → request.rs (assign x-request-id)
//!     → server.rs (Axum router, trace + timeout layers)
//!     → handlers.rs (health, wallet public key)
//!     → custodial provider
//! ```

pub mod handlers;
pub mod request;
pub mod server;

pub use handlers::{AppState, PublicKeyResponse};
pub use request::X_REQUEST_ID;
pub use server::KeyServer;

//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, request span)
//!     → items routes (validate.rs → handler → repository)
//!     → error.rs (route-not-found fallback, terminal error rendering)
//!     → Send to client
//! ```

pub mod error;
pub mod request;
pub mod server;
pub mod validate;

pub use error::{ApiError, ErrorBody};
pub use server::{HttpServer, API_PREFIX};
pub use validate::{Schema, Validated};

//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Outgoing response:
//!     → headers.rs (hardening headers, unless the handler set them)
//! ```
//!
//! CORS is a plain `tower-http` layer and the body size limit is axum's
//! `DefaultBodyLimit`, both wired in `http::server`.

pub mod headers;

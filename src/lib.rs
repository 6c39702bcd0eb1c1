//! In-memory items CRUD service library.

pub mod config;
pub mod http;
pub mod items;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod security;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use items::ItemRepository;
pub use lifecycle::Shutdown;

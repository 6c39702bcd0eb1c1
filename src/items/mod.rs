//! Items resource.
//!
//! # Data Flow
//! ```text
//! Request (method, path, body, query)
//!     → mod.rs (route table: method + path → validator + handler)
//!     → http/validate.rs (params → body → query against model.rs schemas)
//!     → handlers.rs (one repository call, status + JSON)
//!     → repository.rs (in-memory list)
//! ```
//!
//! Unmatched methods on these paths fall through to the route-not-found
//! handler rather than answering 405.

pub mod handlers;
pub mod model;
pub mod repository;

use std::sync::Arc;

use axum::{routing::get, Router};

use self::handlers::*;
use crate::http::error::not_found;

pub use model::{Item, ItemPatch, ItemQuality, ItemWithId, ParamsWithId};
pub use repository::{ItemRepository, RepositoryError};

/// Build the item routes under `prefix` (e.g. "/api/v1").
pub fn setup_items_router(prefix: &str, repository: Arc<ItemRepository>) -> Router {
    Router::new()
        .route(prefix, get(api_root).fallback(not_found))
        .route(&format!("{prefix}/"), get(api_root).fallback(not_found))
        .route(
            &format!("{prefix}/items"),
            get(list_items).post(create_item).fallback(not_found),
        )
        .route(
            &format!("{prefix}/items/{{id}}"),
            get(get_item)
                .put(update_item)
                .delete(delete_item)
                .fallback(not_found),
        )
        .with_state(repository)
}

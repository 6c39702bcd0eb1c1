//! Error taxonomy and terminal error rendering.
//!
//! # Responsibilities
//! - Classify every failure a request can end in
//! - Answer unmatched routes with a route-not-found error
//! - Render errors as `{ message, stack }` JSON, hiding the stack in production
//!
//! # Design Decisions
//! - Handlers never format errors themselves; they return `ApiError`
//! - `ApiError::into_response` attaches the error to the response extensions
//!   and the `render_errors` middleware produces the final body
//! - A variant with no marked status (or a marked 200) is answered with 500

use std::error::Error as _;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{OriginalUri, Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::EnvironmentConfig;
use crate::http::validate::ValidationErrors;
use crate::items::repository::RepositoryError;

/// Placeholder emitted instead of the stack in production.
pub const REDACTED_STACK: &str = "🥞";

/// Every way a request can fail.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Params, body or query did not match the route's schema.
    #[error("{0}")]
    Validation(ValidationErrors),

    /// The body or path could not be decoded at all.
    #[error("{0}")]
    MalformedRequest(String),

    /// The body exceeds the configured size limit.
    #[error("{0}")]
    PayloadTooLarge(String),

    /// The store has no items to list.
    #[error("Unable to retrieve items")]
    NoItems,

    /// A get-by-id lookup missed.
    #[error("Item with id {0} not found.")]
    ItemNotFound(String),

    /// No route matched the method and path.
    #[error("🔍 - Not Found - {0}")]
    RouteNotFound(String),

    /// A repository failure forwarded unchanged.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Anything else.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Status the failing stage marked on the response, if any.
    pub fn marked_status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Validation(_) => Some(StatusCode::UNPROCESSABLE_ENTITY),
            ApiError::MalformedRequest(_) => Some(StatusCode::BAD_REQUEST),
            ApiError::PayloadTooLarge(_) => Some(StatusCode::PAYLOAD_TOO_LARGE),
            ApiError::NoItems | ApiError::ItemNotFound(_) => Some(StatusCode::BAD_REQUEST),
            ApiError::RouteNotFound(_) => Some(StatusCode::NOT_FOUND),
            ApiError::Repository(_) | ApiError::Internal(_) => None,
        }
    }

    /// Final status: the marked one unless unset or the default success code.
    pub fn status_code(&self) -> StatusCode {
        match self.marked_status() {
            Some(status) if status != StatusCode::OK => status,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "ValidationError",
            ApiError::MalformedRequest(_) => "MalformedRequestError",
            ApiError::PayloadTooLarge(_) => "PayloadTooLargeError",
            ApiError::NoItems | ApiError::ItemNotFound(_) => "NotFoundError",
            ApiError::RouteNotFound(_) => "RouteNotFoundError",
            ApiError::Repository(_) => "RepositoryError",
            ApiError::Internal(_) => "Error",
        }
    }

    /// Kind, message and causal chain, one frame per line.
    pub fn trace(&self) -> String {
        let mut trace = format!("{}: {}", self.kind(), self);
        let mut source = self.source();
        while let Some(cause) = source {
            trace.push_str("\n    caused by: ");
            trace.push_str(&cause.to_string());
            source = cause.source();
        }
        trace
    }

    /// Build the response body for the given environment.
    pub fn to_body(&self, environment: &EnvironmentConfig) -> ErrorBody {
        ErrorBody {
            message: self.to_string(),
            stack: if environment.is_production() {
                REDACTED_STACK.to_string()
            } else {
                self.trace()
            },
        }
    }
}

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    pub stack: String,
}

impl IntoResponse for ApiError {
    /// Redacted by default; `render_errors` fills in the stack outside production.
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            message: self.to_string(),
            stack: REDACTED_STACK.to_string(),
        };
        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(self);
        response
    }
}

/// Terminal error formatter.
///
/// Re-renders any response carrying an `ApiError` for the configured
/// environment and logs it.
pub async fn render_errors(
    State(environment): State<Arc<EnvironmentConfig>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let mut response = next.run(request).await;
    let Some(error) = response.extensions_mut().remove::<ApiError>() else {
        return response;
    };

    let status = error.status_code();
    if status.is_server_error() {
        tracing::error!(method = %method, path = %path, status = status.as_u16(), error = %error, "Request failed");
    } else {
        tracing::debug!(method = %method, path = %path, status = status.as_u16(), error = %error, "Request rejected");
    }

    let (mut parts, _) = response.into_parts();
    let (_, body) = Json(error.to_body(&environment)).into_response().into_parts();
    parts.status = status;
    parts.headers.remove(header::CONTENT_LENGTH);
    parts
        .headers
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Response::from_parts(parts, body)
}

/// Fallback for requests no route accepted.
pub async fn not_found(method: Method, OriginalUri(uri): OriginalUri) -> ApiError {
    tracing::debug!(method = %method, uri = %uri, "No route matched");
    ApiError::RouteNotFound(uri.to_string())
}

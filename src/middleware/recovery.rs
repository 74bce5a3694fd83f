use std::any::Any;

use axum::response::{IntoResponse, Response};

use crate::error::ApiError;

/// Panic handler for `CatchPanicLayer`: log the payload, answer with a generic 500.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };

    tracing::error!(panic = %detail, "handler panicked");
    ApiError::internal_server_error().into_response()
}

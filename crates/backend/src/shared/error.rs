//! Application error taxonomy. Handlers return `Result<_, AppError>`;
//! the `IntoResponse` impl maps each variant to a status and a JSON body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed input (bad quantity, missing field). Cart and inventory
    /// are left untouched.
    #[error("{0}")]
    Validation(String),

    /// Checkout attempted with an empty cart
    #[error("cart is empty")]
    EmptyCart,

    /// Live inventory cannot cover a requested line. The whole checkout
    /// aborts; the cart is preserved so the caller can adjust.
    #[error("not enough tickets for '{title}' ({remaining} remaining)")]
    InsufficientInventory {
        event_id: String,
        title: String,
        remaining: i32,
    },

    /// Transient write contention that survived every retry. Nothing was
    /// committed and the cart is preserved; the caller should simply retry.
    #[error("the store is busy, try again")]
    Contention,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Validation(detail) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": "validation", "detail": detail }),
            ),
            AppError::EmptyCart => (
                StatusCode::CONFLICT,
                json!({ "error": "empty_cart", "detail": "Your cart is empty." }),
            ),
            AppError::InsufficientInventory {
                event_id,
                title,
                remaining,
            } => (
                StatusCode::CONFLICT,
                json!({
                    "error": "insufficient_inventory",
                    "eventId": event_id,
                    "title": title,
                    "remaining": remaining,
                    "detail": format!("Not enough tickets for {}.", title),
                }),
            ),
            AppError::Contention => (
                StatusCode::CONFLICT,
                json!({
                    "error": "contention",
                    "detail": "The store is busy right now, please try again.",
                }),
            ),
            AppError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                json!({ "error": "not_found", "detail": format!("{} not found", what) }),
            ),
            AppError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, json!({ "error": "unauthorized" }))
            }
            AppError::Forbidden(detail) => (
                StatusCode::FORBIDDEN,
                json!({ "error": "forbidden", "detail": detail }),
            ),
            AppError::Internal(err) => {
                // Full context goes to the log, a generic body to the caller
                tracing::error!("internal error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "internal" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contention_is_a_conflict_not_a_server_fault() {
        let response = AppError::Contention.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn insufficient_inventory_names_the_event() {
        let err = AppError::InsufficientInventory {
            event_id: "e1".to_string(),
            title: "Jazz Night".to_string(),
            remaining: 2,
        };
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }
}

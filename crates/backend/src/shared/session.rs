//! Opaque session token, carried in the `X-Session-Id` header. A fresh
//! token is minted when the header is absent and echoed back in the cart
//! view so the client can persist it.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

pub const SESSION_HEADER: &str = "x-session-id";

pub struct SessionId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|h| h.to_str().ok())
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.to_string())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        Ok(SessionId(token))
    }
}

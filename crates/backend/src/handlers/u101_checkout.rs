use axum::Json;
use contracts::usecases::u101_checkout::{CheckoutConfirmation, ConfirmRequest};

use crate::shared::error::AppError;
use crate::shared::session::SessionId;
use crate::system::auth::extractor::OptionalUser;
use crate::usecases::u101_checkout::executor;

/// POST /api/checkout/confirm
///
/// Works for guests and authenticated users alike; authenticated callers
/// get the purchase attached to their account.
pub async fn confirm(
    SessionId(session_id): SessionId,
    OptionalUser(claims): OptionalUser,
    Json(request): Json<ConfirmRequest>,
) -> Result<Json<CheckoutConfirmation>, AppError> {
    let confirmation = executor::confirm(&session_id, request, claims.as_ref()).await?;
    Ok(Json(confirmation))
}

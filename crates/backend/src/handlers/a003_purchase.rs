use axum::extract::Path;
use axum::http::StatusCode;
use axum::Json;
use contracts::domain::a003_purchase::aggregate::{PurchaseView, RateRequest};

use crate::domain::a003_purchase;
use crate::shared::error::AppError;
use crate::system::auth::extractor::CurrentUser;

/// GET /api/purchases/:id
///
/// Public by id: the confirmation page works for guests who only hold
/// the purchase id.
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<PurchaseView>, AppError> {
    let uuid = uuid::Uuid::parse_str(&id)
        .map_err(|_| AppError::Validation("Invalid purchase id".into()))?;
    let view = a003_purchase::service::get_view(uuid).await?;
    Ok(Json(view))
}

/// GET /api/purchases/history (authenticated)
pub async fn history(CurrentUser(claims): CurrentUser) -> Result<Json<Vec<PurchaseView>>, AppError> {
    let views = a003_purchase::service::history(&claims).await?;
    Ok(Json(views))
}

/// POST /api/purchases/:id/rating (authenticated owner)
pub async fn rate(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<RateRequest>,
) -> Result<StatusCode, AppError> {
    let uuid = uuid::Uuid::parse_str(&id)
        .map_err(|_| AppError::Validation("Invalid purchase id".into()))?;
    a003_purchase::service::rate(uuid, request.rating, &claims).await?;
    Ok(StatusCode::OK)
}

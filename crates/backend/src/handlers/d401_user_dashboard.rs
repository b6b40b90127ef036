use axum::Json;
use contracts::dashboards::d401_user_dashboard::UserDashboardResponse;

use crate::dashboards::d401_user_dashboard::service;
use crate::shared::error::AppError;
use crate::system::auth::extractor::CurrentUser;

/// GET /api/dashboard (authenticated)
pub async fn dashboard(
    CurrentUser(claims): CurrentUser,
) -> Result<Json<UserDashboardResponse>, AppError> {
    let response = service::dashboard(&claims).await?;
    Ok(Json(response))
}

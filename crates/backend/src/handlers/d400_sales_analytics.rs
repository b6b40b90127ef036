use axum::Json;
use contracts::dashboards::d400_sales_analytics::AnalyticsResponse;

use crate::dashboards::d400_sales_analytics::service;
use crate::shared::error::AppError;
use crate::system::auth::extractor::CurrentUser;

/// GET /api/d400/analytics (organizer or admin)
///
/// Admins see marketplace-wide numbers; organizers only their own events.
pub async fn analytics(CurrentUser(claims): CurrentUser) -> Result<Json<AnalyticsResponse>, AppError> {
    let scope = if claims.role.is_admin() {
        None
    } else {
        Some(claims.sub.as_str())
    };
    let response = service::analytics(scope).await?;
    Ok(Json(response))
}

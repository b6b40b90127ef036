use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::Json;
use contracts::domain::a002_event::aggregate::{EventDto, EventListQuery, EventOverview, EventView};
use serde_json::json;

use crate::domain::a002_event;
use crate::shared::error::AppError;
use crate::system::auth::extractor::CurrentUser;

/// GET /api/events
pub async fn list(Query(query): Query<EventListQuery>) -> Result<Json<Vec<EventView>>, AppError> {
    let items = a002_event::service::list(&query).await?;
    Ok(Json(items))
}

/// GET /api/events/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<EventView>, AppError> {
    let uuid =
        uuid::Uuid::parse_str(&id).map_err(|_| AppError::Validation("Invalid event id".into()))?;
    let view = a002_event::service::get_view(uuid).await?;
    Ok(Json(view))
}

/// POST /api/events (organizer or admin)
pub async fn upsert(
    CurrentUser(claims): CurrentUser,
    Json(dto): Json<EventDto>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = if dto.id.is_some() {
        let id = dto.id.clone().unwrap_or_default();
        a002_event::service::update(dto, &claims).await?;
        id
    } else {
        a002_event::service::create(dto, &claims).await?.to_string()
    };
    Ok(Json(json!({ "id": id })))
}

/// DELETE /api/events/:id (owner or admin)
pub async fn delete(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let uuid =
        uuid::Uuid::parse_str(&id).map_err(|_| AppError::Validation("Invalid event id".into()))?;
    if a002_event::service::delete(uuid, &claims).await? {
        Ok(StatusCode::OK)
    } else {
        Err(AppError::NotFound("event"))
    }
}

/// GET /api/events/overview (admin only)
pub async fn overview() -> Result<Json<EventOverview>, AppError> {
    let overview = a002_event::service::overview().await?;
    Ok(Json(overview))
}

use axum::{extract::Path, http::StatusCode, Json};
use contracts::domain::a001_category::aggregate::{Category, CategoryDto};
use serde_json::json;

use crate::domain::a001_category;
use crate::shared::error::AppError;

/// GET /api/categories
pub async fn list_all() -> Result<Json<Vec<Category>>, AppError> {
    let items = a001_category::service::list_all().await?;
    Ok(Json(items))
}

/// GET /api/categories/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<Category>, AppError> {
    let uuid = uuid::Uuid::parse_str(&id)
        .map_err(|_| AppError::Validation("Invalid category id".into()))?;
    let category = a001_category::service::get_by_id(uuid)
        .await?
        .ok_or(AppError::NotFound("category"))?;
    Ok(Json(category))
}

/// POST /api/categories (admin only)
pub async fn upsert(Json(dto): Json<CategoryDto>) -> Result<Json<serde_json::Value>, AppError> {
    let id = if dto.id.is_some() {
        let id = dto.id.clone().unwrap_or_default();
        a001_category::service::update(dto).await?;
        id
    } else {
        a001_category::service::create(dto).await?.to_string()
    };
    Ok(Json(json!({ "id": id })))
}

/// DELETE /api/categories/:id (admin only)
pub async fn delete(Path(id): Path<String>) -> Result<StatusCode, AppError> {
    let uuid = uuid::Uuid::parse_str(&id)
        .map_err(|_| AppError::Validation("Invalid category id".into()))?;
    if a001_category::service::delete(uuid).await? {
        Ok(StatusCode::OK)
    } else {
        Err(AppError::NotFound("category"))
    }
}

use super::repository;
use crate::shared::error::AppError;
use contracts::domain::a001_category::aggregate::{Category, CategoryDto};
use uuid::Uuid;

/// Create a new category
pub async fn create(dto: CategoryDto) -> Result<Uuid, AppError> {
    let code = dto
        .code
        .clone()
        .unwrap_or_else(|| format!("CAT-{}", Uuid::new_v4()));
    let mut aggregate = Category::new_for_insert(code, dto.name, dto.comment);

    aggregate.validate().map_err(AppError::Validation)?;
    aggregate.before_write();

    let id = repository::insert(&aggregate).await?;
    Ok(id)
}

/// Update an existing category
pub async fn update(dto: CategoryDto) -> Result<(), AppError> {
    let id = dto
        .id
        .as_ref()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| AppError::Validation("Invalid category id".into()))?;

    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or(AppError::NotFound("category"))?;

    aggregate.update(&dto);
    aggregate.validate().map_err(AppError::Validation)?;
    aggregate.before_write();

    repository::update(&aggregate).await?;
    Ok(())
}

/// Soft delete
pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    repository::soft_delete(id).await
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Category>> {
    repository::get_by_id(id).await
}

pub async fn list_all() -> anyhow::Result<Vec<Category>> {
    repository::list_all().await
}

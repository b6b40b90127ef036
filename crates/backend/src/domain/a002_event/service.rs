use std::collections::HashMap;

use super::repository;
use crate::domain::a001_category::repository as category_repository;
use crate::shared::error::AppError;
use contracts::domain::a001_category::aggregate::CategoryId;
use contracts::domain::a002_event::aggregate::{
    Event, EventDto, EventListQuery, EventOverview, EventView,
};
use contracts::domain::common::AggregateId;
use contracts::system::auth::TokenClaims;
use uuid::Uuid;

const LOW_TICKET_THRESHOLD: i32 = 5;

async fn category_names() -> anyhow::Result<HashMap<String, String>> {
    let map = category_repository::list_all()
        .await?
        .into_iter()
        .map(|c| (c.base.id.as_string(), c.base.description))
        .collect();
    Ok(map)
}

fn to_view(event: Event, names: &HashMap<String, String>) -> EventView {
    let category_name = event
        .category_id
        .map(|c| c.as_string())
        .and_then(|id| names.get(&id).cloned());
    EventView {
        event,
        category_name,
    }
}

/// Public catalog listing with filters, enriched with category names
pub async fn list(query: &EventListQuery) -> anyhow::Result<Vec<EventView>> {
    let names = category_names().await?;
    let items = repository::list(query)
        .await?
        .into_iter()
        .map(|e| to_view(e, &names))
        .collect();
    Ok(items)
}

pub async fn get_view(id: Uuid) -> Result<EventView, AppError> {
    let event = repository::get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("event"))?;
    let names = category_names().await?;
    Ok(to_view(event, &names))
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Event>> {
    repository::get_by_id(id).await
}

/// Create an event. The caller's identity becomes the organizer.
pub async fn create(dto: EventDto, claims: &TokenClaims) -> Result<Uuid, AppError> {
    let code = dto
        .code
        .clone()
        .unwrap_or_else(|| format!("EVT-{}", Uuid::new_v4()));
    let category_id = dto
        .category_id
        .as_deref()
        .and_then(|s| CategoryId::from_string(s).ok());
    let mut aggregate = Event::new_for_insert(
        code,
        dto.title.clone(),
        dto.date_time,
        dto.ticket_price,
        dto.available_tickets,
        category_id,
        Some(claims.sub.clone()),
        dto.image_url.clone(),
    );

    aggregate.validate().map_err(AppError::Validation)?;
    aggregate.before_write();

    let id = repository::insert(&aggregate).await?;
    Ok(id)
}

/// Update an event. Only the owning organizer or an admin may change it.
pub async fn update(dto: EventDto, claims: &TokenClaims) -> Result<(), AppError> {
    let id = dto
        .id
        .as_ref()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| AppError::Validation("Invalid event id".into()))?;

    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("event"))?;

    ensure_owner(&aggregate, claims)?;

    aggregate.update(&dto);
    aggregate.validate().map_err(AppError::Validation)?;
    aggregate.before_write();

    repository::update(&aggregate).await?;
    Ok(())
}

pub async fn delete(id: Uuid, claims: &TokenClaims) -> Result<bool, AppError> {
    let aggregate = repository::get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("event"))?;

    ensure_owner(&aggregate, claims)?;

    let deleted = repository::soft_delete(id).await?;
    Ok(deleted)
}

fn ensure_owner(event: &Event, claims: &TokenClaims) -> Result<(), AppError> {
    if claims.role.is_admin() {
        return Ok(());
    }
    if event.organizer_id.as_deref() == Some(claims.sub.as_str()) {
        return Ok(());
    }
    Err(AppError::Forbidden(
        "You do not own this event".to_string(),
    ))
}

/// Admin catalog overview
pub async fn overview() -> anyhow::Result<EventOverview> {
    let total_events = repository::count_active().await?;
    let total_categories = category_repository::count_active().await?;
    let names = category_names().await?;
    let low_ticket_events = repository::list_low_tickets(LOW_TICKET_THRESHOLD)
        .await?
        .into_iter()
        .map(|e| to_view(e, &names))
        .collect();
    Ok(EventOverview {
        total_events,
        total_categories,
        low_ticket_events,
    })
}

pub async fn list_by_organizer(organizer_id: &str) -> anyhow::Result<Vec<EventView>> {
    let names = category_names().await?;
    let items = repository::list_by_organizer(organizer_id)
        .await?
        .into_iter()
        .map(|e| to_view(e, &names))
        .collect();
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db;
    use chrono::{Duration, Utc};
    use contracts::system::auth::Role;

    fn claims(sub: &str, role: Role) -> TokenClaims {
        TokenClaims {
            sub: sub.to_string(),
            username: sub.to_string(),
            role,
            exp: 0,
            iat: 0,
        }
    }

    fn dto(title: &str) -> EventDto {
        EventDto {
            title: title.to_string(),
            date_time: Utc::now() + Duration::days(14),
            ticket_price: 20.0,
            available_tickets: 50,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn organizer_cannot_edit_someone_elses_event() {
        db::init_test_database().await;
        let owner = claims(&db::seed_test_user(Role::Organizer).await, Role::Organizer);
        let intruder = claims(&db::seed_test_user(Role::Organizer).await, Role::Organizer);

        let id = create(dto("Owned Event"), &owner).await.unwrap();

        let mut change = dto("Hijacked");
        change.id = Some(id.to_string());
        let err = update(change, &intruder).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn admin_can_edit_any_event() {
        db::init_test_database().await;
        let owner_id = db::seed_test_user(Role::Organizer).await;
        let owner = claims(&owner_id, Role::Organizer);
        let admin = claims(&db::seed_test_user(Role::Admin).await, Role::Admin);

        let id = create(dto("Admin Target"), &owner).await.unwrap();

        let mut change = dto("Renamed by admin");
        change.id = Some(id.to_string());
        update(change, &admin).await.unwrap();

        let view = get_view(id).await.unwrap();
        assert_eq!(view.event.title(), "Renamed by admin");
        assert_eq!(view.event.organizer_id.as_deref(), Some(owner_id.as_str()));
    }

    #[tokio::test]
    async fn create_rejects_negative_price() {
        db::init_test_database().await;
        let owner = claims(&db::seed_test_user(Role::Organizer).await, Role::Organizer);
        let mut bad = dto("Bad Price");
        bad.ticket_price = -1.0;
        let err = create(bad, &owner).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}

use axum::extract::Path;
use axum::http::StatusCode;
use axum::Json;
use contracts::domain::a002_event::aggregate::EventId;
use contracts::domain::common::AggregateId;
use contracts::shared::cart::{AddToCartRequest, CartItem, CartView, UpdateQuantityRequest};

use crate::domain::a002_event;
use crate::shared::cart;
use crate::shared::error::AppError;
use crate::shared::session::SessionId;

fn parse_event_id(raw: &str) -> Result<EventId, AppError> {
    EventId::from_string(raw).map_err(|_| AppError::Validation("Invalid event id".into()))
}

/// GET /api/cart
pub async fn get(SessionId(session_id): SessionId) -> Result<Json<CartView>, AppError> {
    let items = cart::store().get_cart(&session_id);
    Ok(Json(cart::view(&session_id, items)))
}

/// POST /api/cart/items
///
/// Snapshots title, category, price and availability from the catalog at
/// add time. The availability check here is advisory; the binding check
/// happens at checkout.
pub async fn add_item(
    SessionId(session_id): SessionId,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartView>, AppError> {
    if request.quantity < 1 {
        return Err(AppError::Validation("Quantity must be at least 1".into()));
    }

    let event_id = parse_event_id(&request.event_id)?;
    let view = a002_event::service::get_view(event_id.value()).await?;
    let event = view.event;

    if event.is_sold_out() {
        return Err(AppError::Validation(format!(
            "'{}' is sold out",
            event.title()
        )));
    }

    let already_in_cart = cart::store()
        .get_cart(&session_id)
        .iter()
        .find(|i| i.event_id == event_id)
        .map(|i| i.quantity)
        .unwrap_or(0);
    if already_in_cart + request.quantity > event.available_tickets {
        return Err(AppError::Validation(format!(
            "Only {} tickets available for '{}'",
            event.available_tickets,
            event.title()
        )));
    }

    let snapshot = CartItem {
        event_id,
        event_title: event.title().to_string(),
        category_name: view.category_name.unwrap_or_default(),
        event_date_time: event.date_time,
        ticket_price: event.ticket_price,
        available_tickets: event.available_tickets,
        quantity: request.quantity,
    };

    let items = cart::store().add_item(&session_id, snapshot)?;
    Ok(Json(cart::view(&session_id, items)))
}

/// PUT /api/cart/items
///
/// A non-positive quantity removes the line. For a positive one the live
/// availability is re-checked, advisory like on add.
pub async fn update_quantity(
    SessionId(session_id): SessionId,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartView>, AppError> {
    let event_id = parse_event_id(&request.event_id)?;

    if request.quantity > 0 {
        let event = a002_event::service::get_by_id(event_id.value())
            .await?
            .ok_or(AppError::NotFound("event"))?;
        if request.quantity > event.available_tickets {
            return Err(AppError::Validation(format!(
                "Only {} tickets available for '{}'",
                event.available_tickets,
                event.title()
            )));
        }
    }

    let items = cart::store().update_quantity(&session_id, event_id, request.quantity);
    Ok(Json(cart::view(&session_id, items)))
}

/// DELETE /api/cart/items/:event_id
pub async fn remove_item(
    SessionId(session_id): SessionId,
    Path(event_id): Path<String>,
) -> Result<Json<CartView>, AppError> {
    let event_id = parse_event_id(&event_id)?;
    let items = cart::store().remove_item(&session_id, event_id);
    Ok(Json(cart::view(&session_id, items)))
}

/// DELETE /api/cart
pub async fn clear(SessionId(session_id): SessionId) -> Result<StatusCode, AppError> {
    cart::store().clear(&session_id);
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a002_event::repository as event_repository;
    use crate::shared::data::db;
    use chrono::{Duration, Utc};
    use contracts::domain::a002_event::aggregate::Event;
    use uuid::Uuid;

    async fn seed_event(tickets: i32) -> Event {
        let event = Event::new_for_insert(
            format!("EVT-{}", Uuid::new_v4()),
            "Small Venue".to_string(),
            Utc::now() + Duration::days(7),
            10.0,
            tickets,
            None,
            None,
            None,
        );
        event_repository::insert(&event).await.expect("seed event");
        event
    }

    #[tokio::test]
    async fn update_rejects_quantity_above_live_availability() {
        db::init_test_database().await;
        let event = seed_event(3).await;
        let session = format!("cart-{}", Uuid::new_v4());

        add_item(
            SessionId(session.clone()),
            Json(AddToCartRequest {
                event_id: event.base.id.as_string(),
                quantity: 2,
            }),
        )
        .await
        .unwrap();

        let err = update_quantity(
            SessionId(session.clone()),
            Json(UpdateQuantityRequest {
                event_id: event.base.id.as_string(),
                quantity: 10,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        // The line is untouched by the rejected update
        let view = update_quantity(
            SessionId(session),
            Json(UpdateQuantityRequest {
                event_id: event.base.id.as_string(),
                quantity: 3,
            }),
        )
        .await
        .unwrap();
        assert_eq!(view.0.items[0].quantity, 3);
    }

    #[tokio::test]
    async fn update_for_unknown_event_is_not_found() {
        db::init_test_database().await;
        let session = format!("cart-{}", Uuid::new_v4());

        let err = update_quantity(
            SessionId(session),
            Json(UpdateQuantityRequest {
                event_id: Uuid::new_v4().to_string(),
                quantity: 2,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound("event")));
    }
}

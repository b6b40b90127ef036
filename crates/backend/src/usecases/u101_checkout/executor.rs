//! Checkout: turn a session cart into a purchase document, atomically
//! decrementing inventory. Either every line commits or nothing does.

use chrono::Utc;
use contracts::domain::a003_purchase::aggregate::{
    Purchase, PurchaseId, PurchaseLine, PurchaseLineView,
};
use contracts::domain::common::AggregateId;
use contracts::shared::cart::CartItem;
use contracts::system::auth::TokenClaims;
use contracts::usecases::u101_checkout::{CheckoutConfirmation, ConfirmRequest};
use sea_orm::TransactionTrait;

use crate::domain::a001_category::repository as category_repository;
use crate::domain::a002_event::repository as event_repository;
use crate::domain::a003_purchase::repository as purchase_repository;
use crate::shared::cart;
use crate::shared::data::db::get_connection;
use crate::shared::error::AppError;
use crate::system::users::repository as users_repository;

const GUEST_NAME_PLACEHOLDER: &str = "Anonymous";
const GUEST_EMAIL_PLACEHOLDER: &str = "guest@example.com";

/// Bounded retries for transient SQLite write contention
const MAX_COMMIT_ATTEMPTS: usize = 3;

/// Confirm the cart of `session_id` as a purchase. On success the cart is
/// cleared; on any error it is preserved so the caller can adjust.
pub async fn confirm(
    session_id: &str,
    request: ConfirmRequest,
    claims: Option<&TokenClaims>,
) -> Result<CheckoutConfirmation, AppError> {
    let mut items = cart::store().get_cart(session_id);
    if items.is_empty() {
        return Err(AppError::EmptyCart);
    }

    // Canonical line order keeps concurrent checkouts taking row locks in
    // the same sequence
    items.sort_by_key(|item| item.event_id.as_string());

    let (guest_name, guest_email, user_id) = resolve_identity(&request, claims).await?;

    for _ in 0..MAX_COMMIT_ATTEMPTS {
        match commit_attempt(&items, &guest_name, &guest_email, user_id.as_deref()).await {
            Ok(confirmation) => {
                cart::store().clear(session_id);
                tracing::info!(
                    purchase_id = %confirmation.purchase_id,
                    total_cost = confirmation.total_cost,
                    lines = confirmation.lines.len(),
                    "checkout committed"
                );
                return Ok(confirmation);
            }
            Err(AppError::Internal(err)) if is_busy(&err) => {
                tracing::warn!("checkout retry after busy database: {:#}", err);
            }
            Err(other) => return Err(other),
        }
    }

    // Nothing committed; the caller can retry with the cart intact
    tracing::warn!(
        "checkout gave up after {} busy attempts, cart preserved",
        MAX_COMMIT_ATTEMPTS
    );
    Err(AppError::Contention)
}

/// Authenticated callers buy under their profile name and email no matter
/// what the request body says; guests fall back to placeholders.
async fn resolve_identity(
    request: &ConfirmRequest,
    claims: Option<&TokenClaims>,
) -> Result<(String, String, Option<String>), AppError> {
    if let Some(claims) = claims {
        let user = users_repository::get_by_id(&claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)?;
        let name = user
            .full_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(&user.username)
            .to_string();
        let email = user
            .email
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(GUEST_EMAIL_PLACEHOLDER)
            .to_string();
        return Ok((name, email, Some(user.id)));
    }

    let name = request
        .guest_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(GUEST_NAME_PLACEHOLDER)
        .to_string();
    let email = request
        .guest_email
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(GUEST_EMAIL_PLACEHOLDER)
        .to_string();
    Ok((name, email, None))
}

/// One transactional attempt. Prices come from the live catalog rows read
/// inside the transaction, not from the cart snapshots.
async fn commit_attempt(
    items: &[CartItem],
    guest_name: &str,
    guest_email: &str,
    user_id: Option<&str>,
) -> Result<CheckoutConfirmation, AppError> {
    let txn = get_connection().begin().await.map_err(anyhow::Error::from)?;

    let purchase_id = PurchaseId::new_v4();
    let mut lines = Vec::with_capacity(items.len());
    let mut line_views = Vec::with_capacity(items.len());
    let mut total_cost = 0.0_f64;

    for item in items {
        let event_id = item.event_id.value();
        let event = event_repository::get_by_id_on(&txn, event_id)
            .await?
            .ok_or(AppError::NotFound("event"))?;

        let reserved = event_repository::try_reserve(&txn, event_id, item.quantity).await?;
        if !reserved {
            txn.rollback().await.map_err(anyhow::Error::from)?;
            return Err(AppError::InsufficientInventory {
                event_id: event_id.to_string(),
                title: event.title().to_string(),
                remaining: event.available_tickets,
            });
        }

        let line_total = event.ticket_price * item.quantity as f64;
        total_cost += line_total;

        lines.push(PurchaseLine {
            purchase_id,
            event_id: item.event_id,
            quantity: item.quantity,
            total_price: line_total,
        });
        let category_name = match event.category_id {
            Some(category_id) => category_repository::get_by_id_on(&txn, category_id.value())
                .await?
                .map(|c| c.base.description),
            None => None,
        };
        line_views.push(PurchaseLineView {
            event_id: item.event_id,
            event_title: event.title().to_string(),
            event_date_time: event.date_time,
            category_name,
            quantity: item.quantity,
            total_price: line_total,
        });
    }

    let purchase = Purchase {
        id: purchase_id,
        guest_name: guest_name.to_string(),
        guest_email: guest_email.to_string(),
        purchase_date: Utc::now(),
        total_cost,
        user_id: user_id.map(str::to_string),
        rating: None,
        lines,
    };

    purchase_repository::insert_with_lines(&txn, &purchase).await?;
    txn.commit().await.map_err(anyhow::Error::from)?;

    Ok(CheckoutConfirmation {
        purchase_id: purchase.id.as_string(),
        total_cost,
        lines: line_views,
    })
}

fn is_busy(err: &anyhow::Error) -> bool {
    let text = format!("{err:#}").to_lowercase();
    text.contains("locked") || text.contains("busy")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db;
    use chrono::Duration;
    use contracts::domain::a002_event::aggregate::Event;
    use contracts::domain::a002_event::aggregate::EventId;
    use uuid::Uuid;

    async fn seed_event(title: &str, price: f64, tickets: i32) -> EventId {
        let event = Event::new_for_insert(
            format!("EVT-{}", Uuid::new_v4()),
            title.to_string(),
            Utc::now() + Duration::days(7),
            price,
            tickets,
            None,
            None,
            None,
        );
        let id = event_repository::insert(&event).await.expect("seed event");
        EventId::new(id)
    }

    fn cart_item(event_id: EventId, title: &str, price: f64, quantity: i32) -> CartItem {
        CartItem {
            event_id,
            event_title: title.to_string(),
            category_name: String::new(),
            event_date_time: Utc::now() + Duration::days(7),
            ticket_price: price,
            available_tickets: 100,
            quantity,
        }
    }

    #[tokio::test]
    async fn guest_checkout_commits_and_clears_the_cart() {
        db::init_test_database().await;
        let event_id = seed_event("Jazz Night", 25.0, 100).await;

        let session = format!("sess-{}", Uuid::new_v4());
        cart::store()
            .add_item(&session, cart_item(event_id, "Jazz Night", 25.0, 2))
            .unwrap();

        let confirmation = confirm(&session, ConfirmRequest::default(), None)
            .await
            .unwrap();

        assert!((confirmation.total_cost - 50.0).abs() < f64::EPSILON);
        assert_eq!(confirmation.lines.len(), 1);
        assert!(cart::store().get_cart(&session).is_empty());

        let event = event_repository::get_by_id(event_id.value())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.available_tickets, 98);

        let purchase = purchase_repository::get_with_lines(
            Uuid::parse_str(&confirmation.purchase_id).unwrap(),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(purchase.guest_name, "Anonymous");
        assert_eq!(purchase.guest_email, "guest@example.com");
        assert!(purchase.user_id.is_none());
    }

    #[tokio::test]
    async fn insufficient_inventory_aborts_whole_checkout() {
        db::init_test_database().await;
        let plenty = seed_event("Big Venue", 10.0, 100).await;
        let scarce = seed_event("Tiny Venue", 10.0, 3).await;

        let session = format!("sess-{}", Uuid::new_v4());
        cart::store()
            .add_item(&session, cart_item(plenty, "Big Venue", 10.0, 2))
            .unwrap();
        cart::store()
            .add_item(&session, cart_item(scarce, "Tiny Venue", 10.0, 5))
            .unwrap();

        let err = confirm(&session, ConfirmRequest::default(), None)
            .await
            .unwrap_err();
        match err {
            AppError::InsufficientInventory {
                title, remaining, ..
            } => {
                assert_eq!(title, "Tiny Venue");
                assert_eq!(remaining, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // Nothing committed, cart preserved
        let untouched = event_repository::get_by_id(plenty.value())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(untouched.available_tickets, 100);
        assert_eq!(cart::store().get_cart(&session).len(), 2);
    }

    #[tokio::test]
    async fn empty_cart_is_rejected() {
        db::init_test_database().await;
        let session = format!("sess-{}", Uuid::new_v4());
        let err = confirm(&session, ConfirmRequest::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmptyCart));
    }

    #[tokio::test]
    async fn concurrent_checkouts_never_oversell() {
        db::init_test_database().await;
        let event_id = seed_event("Last Five", 20.0, 5).await;

        let mut handles = Vec::new();
        for i in 0..8 {
            let session = format!("race-{}-{}", i, Uuid::new_v4());
            cart::store()
                .add_item(&session, cart_item(event_id, "Last Five", 20.0, 1))
                .unwrap();
            handles.push(tokio::spawn(async move {
                confirm(&session, ConfirmRequest::default(), None).await
            }));
        }

        let mut committed = 0;
        let mut refused = 0;
        for handle in handles {
            match handle.await.expect("task panicked") {
                Ok(_) => committed += 1,
                Err(AppError::InsufficientInventory { .. }) => refused += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
        assert_eq!(committed, 5);
        assert_eq!(refused, 3);

        let event = event_repository::get_by_id(event_id.value())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.available_tickets, 0);
    }
}

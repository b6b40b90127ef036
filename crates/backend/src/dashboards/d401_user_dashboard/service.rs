use anyhow::Result;
use chrono::{DateTime, Utc};
use contracts::dashboards::d401_user_dashboard::UserDashboardResponse;
use contracts::domain::a003_purchase::aggregate::PurchaseView;
use contracts::system::auth::TokenClaims;

use crate::domain::a002_event::service as event_service;
use crate::domain::a003_purchase::service as purchase_service;

fn soonest_upcoming(purchase: &PurchaseView, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    purchase
        .lines
        .iter()
        .map(|l| l.event_date_time)
        .filter(|dt| *dt > now)
        .min()
}

/// Build the personal dashboard: purchases split into upcoming tickets and
/// history, plus owned events for organizer accounts.
pub async fn dashboard(claims: &TokenClaims) -> Result<UserDashboardResponse> {
    let purchases = purchase_service::history(claims).await?;
    let now = Utc::now();

    let mut my_tickets: Vec<PurchaseView> = Vec::new();
    let mut purchase_history: Vec<PurchaseView> = Vec::new();
    for purchase in purchases {
        if soonest_upcoming(&purchase, now).is_some() {
            my_tickets.push(purchase);
        } else {
            purchase_history.push(purchase);
        }
    }

    // Upcoming tickets ordered by the nearest event; history stays newest first
    my_tickets.sort_by_key(|p| soonest_upcoming(p, now));

    let my_events = if claims.role.can_organize() {
        event_service::list_by_organizer(&claims.sub).await?
    } else {
        Vec::new()
    };

    Ok(UserDashboardResponse {
        my_tickets,
        purchase_history,
        my_events,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a002_event::repository as event_repository;
    use crate::domain::a003_purchase::repository as purchase_repository;
    use crate::shared::data::db;
    use chrono::Duration;
    use contracts::domain::a002_event::aggregate::Event;
    use contracts::domain::a003_purchase::aggregate::{Purchase, PurchaseId, PurchaseLine};
    use contracts::system::auth::Role;
    use uuid::Uuid;

    fn claims(sub: &str, role: Role) -> TokenClaims {
        TokenClaims {
            sub: sub.to_string(),
            username: sub.to_string(),
            role,
            exp: 0,
            iat: 0,
        }
    }

    async fn seed_purchase(user_id: &str, title: &str, days_from_now: i64) {
        let event = Event::new_for_insert(
            format!("EVT-{}", Uuid::new_v4()),
            title.to_string(),
            Utc::now() + Duration::days(days_from_now),
            8.0,
            30,
            None,
            None,
            None,
        );
        event_repository::insert(&event).await.expect("seed event");

        let id = PurchaseId::new_v4();
        let purchase = Purchase {
            id,
            guest_name: "Anonymous".to_string(),
            guest_email: "guest@example.com".to_string(),
            purchase_date: Utc::now(),
            total_cost: 8.0,
            user_id: Some(user_id.to_string()),
            rating: None,
            lines: vec![PurchaseLine {
                purchase_id: id,
                event_id: event.base.id,
                quantity: 1,
                total_price: 8.0,
            }],
        };
        purchase_repository::insert_with_lines(db::get_connection(), &purchase)
            .await
            .expect("seed purchase");
    }

    #[tokio::test]
    async fn purchases_split_between_tickets_and_history() {
        db::init_test_database().await;
        let user = db::seed_test_user(Role::User).await;

        seed_purchase(&user, "Future Show", 10).await;
        seed_purchase(&user, "Past Show", -10).await;

        let response = dashboard(&claims(&user, Role::User)).await.unwrap();

        assert_eq!(response.my_tickets.len(), 1);
        assert_eq!(response.my_tickets[0].lines[0].event_title, "Future Show");
        assert_eq!(response.purchase_history.len(), 1);
        assert_eq!(
            response.purchase_history[0].lines[0].event_title,
            "Past Show"
        );
        assert!(response.my_events.is_empty());
    }

    #[tokio::test]
    async fn organizers_see_their_own_events() {
        db::init_test_database().await;
        let organizer = db::seed_test_user(Role::Organizer).await;

        let event = Event::new_for_insert(
            format!("EVT-{}", Uuid::new_v4()),
            "Owned Show".to_string(),
            Utc::now() + Duration::days(20),
            15.0,
            60,
            None,
            Some(organizer.clone()),
            None,
        );
        event_repository::insert(&event).await.unwrap();

        let response = dashboard(&claims(&organizer, Role::Organizer))
            .await
            .unwrap();
        assert_eq!(response.my_events.len(), 1);
        assert_eq!(response.my_events[0].event.title(), "Owned Show");
    }
}

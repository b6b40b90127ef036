use anyhow::Result;
use contracts::dashboards::d400_sales_analytics::{
    AnalyticsResponse, CategorySales, MonthRevenue, TopEvent,
};

use super::repository;

/// Assemble the analytics dashboard. Admins see the whole marketplace;
/// organizers see only their own events' sales.
pub async fn analytics(organizer_scope: Option<&str>) -> Result<AnalyticsResponse> {
    let (categories, months, top) = match organizer_scope {
        Some(organizer_id) => (
            repository::sales_by_category_for_organizer(organizer_id).await?,
            repository::revenue_by_month_for_organizer(organizer_id).await?,
            repository::top_events_for_organizer(organizer_id).await?,
        ),
        None => (
            repository::sales_by_category_all().await?,
            repository::revenue_by_month_all().await?,
            repository::top_events_all().await?,
        ),
    };

    Ok(AnalyticsResponse {
        sales_by_category: categories
            .into_iter()
            .map(|r| CategorySales {
                category: r.category,
                tickets_sold: r.tickets_sold,
            })
            .collect(),
        revenue_by_month: months
            .into_iter()
            .map(|r| MonthRevenue {
                month: r.month,
                revenue: r.revenue,
            })
            .collect(),
        top_events: top
            .into_iter()
            .map(|r| TopEvent {
                title: r.title,
                tickets_sold: r.tickets_sold,
                revenue: r.revenue,
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a002_event::repository as event_repository;
    use crate::domain::a003_purchase::repository as purchase_repository;
    use crate::shared::data::db;
    use chrono::{Duration, Utc};
    use contracts::domain::a002_event::aggregate::Event;
    use contracts::domain::a003_purchase::aggregate::{Purchase, PurchaseId, PurchaseLine};
    use contracts::system::auth::Role;
    use uuid::Uuid;

    async fn seed_sale(organizer: &str, title: &str, price: f64, quantity: i32) {
        let event = Event::new_for_insert(
            format!("EVT-{}", Uuid::new_v4()),
            title.to_string(),
            Utc::now() + Duration::days(3),
            price,
            500,
            None,
            Some(organizer.to_string()),
            None,
        );
        event_repository::insert(&event).await.expect("seed event");

        let id = PurchaseId::new_v4();
        let purchase = Purchase {
            id,
            guest_name: "Anonymous".to_string(),
            guest_email: "guest@example.com".to_string(),
            purchase_date: Utc::now(),
            total_cost: price * quantity as f64,
            user_id: None,
            rating: None,
            lines: vec![PurchaseLine {
                purchase_id: id,
                event_id: event.base.id,
                quantity,
                total_price: price * quantity as f64,
            }],
        };
        purchase_repository::insert_with_lines(db::get_connection(), &purchase)
            .await
            .expect("seed purchase");
    }

    #[tokio::test]
    async fn organizer_scope_counts_only_their_sales() {
        db::init_test_database().await;
        let organizer = db::seed_test_user(Role::Organizer).await;
        let stranger = db::seed_test_user(Role::Organizer).await;

        seed_sale(&organizer, "Scoped Gala", 30.0, 4).await;
        seed_sale(&stranger, "Other Gala", 30.0, 9).await;

        let response = analytics(Some(&organizer)).await.unwrap();

        let total_tickets: i64 = response
            .sales_by_category
            .iter()
            .map(|c| c.tickets_sold)
            .sum();
        assert_eq!(total_tickets, 4);

        assert_eq!(response.top_events.len(), 1);
        assert_eq!(response.top_events[0].title, "Scoped Gala");
        assert_eq!(response.top_events[0].tickets_sold, 4);
        assert!((response.top_events[0].revenue - 120.0).abs() < f64::EPSILON);

        let this_month = Utc::now().format("%Y-%m").to_string();
        assert!(response
            .revenue_by_month
            .iter()
            .any(|m| m.month == this_month && (m.revenue - 120.0).abs() < f64::EPSILON));
    }

    #[tokio::test]
    async fn uncategorized_events_fall_into_a_named_bucket() {
        db::init_test_database().await;
        let organizer = db::seed_test_user(Role::Organizer).await;
        seed_sale(&organizer, "No Category", 5.0, 2).await;

        let response = analytics(Some(&organizer)).await.unwrap();
        assert_eq!(response.sales_by_category.len(), 1);
        assert_eq!(response.sales_by_category[0].category, "Uncategorized");
        assert_eq!(response.sales_by_category[0].tickets_sold, 2);
    }

    #[tokio::test]
    async fn organizer_without_sales_gets_empty_sections() {
        db::init_test_database().await;
        let organizer = db::seed_test_user(Role::Organizer).await;

        let response = analytics(Some(&organizer)).await.unwrap();
        assert!(response.sales_by_category.is_empty());
        assert!(response.revenue_by_month.is_empty());
        assert!(response.top_events.is_empty());
    }
}

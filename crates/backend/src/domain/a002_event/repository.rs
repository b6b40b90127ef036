use chrono::Utc;
use contracts::domain::a001_category::aggregate::CategoryId;
use contracts::domain::a002_event::aggregate::{
    Event, EventId, EventListQuery, EventListSort,
};
use contracts::domain::common::{AggregateId, BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DatabaseBackend, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, Statement,
};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a002_event")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub date_time: chrono::DateTime<chrono::Utc>,
    pub ticket_price: f64,
    pub available_tickets: i32,
    pub category_id: Option<String>,
    pub organizer_id: Option<String>,
    pub image_url: Option<String>,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Event {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());

        Event {
            base: BaseAggregate::with_metadata(
                EventId(uuid),
                m.code,
                m.description,
                m.comment.clone(),
                metadata,
            ),
            date_time: m.date_time,
            ticket_price: m.ticket_price,
            available_tickets: m.available_tickets,
            category_id: m
                .category_id
                .as_deref()
                .and_then(|s| CategoryId::from_string(s).ok()),
            organizer_id: m.organizer_id,
            image_url: m.image_url,
        }
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

/// Public catalog list with search, category and date-range filters
pub async fn list(query: &EventListQuery) -> anyhow::Result<Vec<Event>> {
    let mut condition = Condition::all().add(Column::IsDeleted.eq(false));

    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        condition = condition.add(Column::Description.contains(search.trim()));
    }
    if let Some(category) = query.category_filter.as_deref() {
        condition = condition.add(Column::CategoryId.eq(category));
    }
    if let (Some(start), Some(end)) = (query.start_date, query.end_date) {
        condition = condition
            .add(Column::DateTime.gte(start))
            .add(Column::DateTime.lte(end));
    }

    let mut find = Entity::find().filter(condition);
    find = match query.sort_order.unwrap_or_default() {
        EventListSort::Title => find.order_by_asc(Column::Description),
        EventListSort::Date => find.order_by_asc(Column::DateTime),
        EventListSort::Price => find.order_by_asc(Column::TicketPrice),
        EventListSort::Default => find.order_by_asc(Column::CreatedAt),
    };

    let items = find.all(conn()).await?.into_iter().map(Into::into).collect();
    Ok(items)
}

/// Events with tickets still on sale
pub async fn list_available() -> anyhow::Result<Vec<Event>> {
    let items = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .filter(Column::AvailableTickets.gt(0))
        .order_by_asc(Column::DateTime)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn list_by_organizer(organizer_id: &str) -> anyhow::Result<Vec<Event>> {
    let items = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .filter(Column::OrganizerId.eq(organizer_id))
        .order_by_desc(Column::DateTime)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Event>> {
    get_by_id_on(conn(), id).await
}

/// Same lookup usable inside a checkout transaction
pub async fn get_by_id_on<C: ConnectionTrait>(db: &C, id: Uuid) -> anyhow::Result<Option<Event>> {
    let result = Entity::find_by_id(id.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(db)
        .await?;
    Ok(result.map(Into::into))
}

pub async fn count_active() -> anyhow::Result<i64> {
    let count = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .count(conn())
        .await?;
    Ok(count as i64)
}

/// Events running low on tickets (admin overview)
pub async fn list_low_tickets(threshold: i32) -> anyhow::Result<Vec<Event>> {
    let items = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .filter(Column::AvailableTickets.lte(threshold))
        .order_by_asc(Column::AvailableTickets)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn insert(aggregate: &Event) -> anyhow::Result<Uuid> {
    let uuid = aggregate.base.id.value();
    let active = ActiveModel {
        id: Set(uuid.to_string()),
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        date_time: Set(aggregate.date_time),
        ticket_price: Set(aggregate.ticket_price),
        available_tickets: Set(aggregate.available_tickets),
        category_id: Set(aggregate.category_id.map(|c| c.as_string())),
        organizer_id: Set(aggregate.organizer_id.clone()),
        image_url: Set(aggregate.image_url.clone()),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    };
    active.insert(conn()).await?;
    Ok(uuid)
}

pub async fn update(aggregate: &Event) -> anyhow::Result<()> {
    let id = aggregate.base.id.value().to_string();
    let active = ActiveModel {
        id: Set(id),
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        date_time: Set(aggregate.date_time),
        ticket_price: Set(aggregate.ticket_price),
        available_tickets: Set(aggregate.available_tickets),
        category_id: Set(aggregate.category_id.map(|c| c.as_string())),
        organizer_id: Set(aggregate.organizer_id.clone()),
        image_url: Set(aggregate.image_url.clone()),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
        created_at: sea_orm::ActiveValue::NotSet,
    };
    active.update(conn()).await?;
    Ok(())
}

pub async fn soft_delete(id: Uuid) -> anyhow::Result<bool> {
    use sea_orm::sea_query::Expr;
    let result = Entity::update_many()
        .col_expr(Column::IsDeleted, Expr::value(true))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id.to_string()))
        .exec(conn())
        .await?;
    Ok(result.rows_affected > 0)
}

/// Inventory ledger entry point: decrement `available_tickets` only if the
/// result stays non-negative. A conditional single-statement update, so two
/// concurrent checkouts can never both take the last units. Returns false
/// when live inventory cannot cover the request.
pub async fn try_reserve<C: ConnectionTrait>(
    db: &C,
    event_id: Uuid,
    quantity: i32,
) -> anyhow::Result<bool> {
    let result = db
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "UPDATE a002_event
             SET available_tickets = available_tickets - ?, updated_at = ?
             WHERE id = ? AND is_deleted = 0 AND available_tickets >= ?",
            [
                quantity.into(),
                Utc::now().into(),
                event_id.to_string().into(),
                quantity.into(),
            ],
        ))
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db;
    use contracts::domain::a002_event::aggregate::Event;

    async fn seed_event(tickets: i32) -> Uuid {
        let event = Event::new_for_insert(
            format!("EVT-{}", Uuid::new_v4()),
            "Reserve Test".to_string(),
            Utc::now() + chrono::Duration::days(30),
            10.0,
            tickets,
            None,
            None,
            None,
        );
        insert(&event).await.expect("seed event")
    }

    #[tokio::test]
    async fn try_reserve_decrements_exactly() {
        db::init_test_database().await;
        let id = seed_event(10).await;

        let reserved = try_reserve(conn(), id, 4).await.unwrap();
        assert!(reserved);

        let event = get_by_id(id).await.unwrap().unwrap();
        assert_eq!(event.available_tickets, 6);
    }

    #[tokio::test]
    async fn try_reserve_refuses_overdraw_and_leaves_stock_untouched() {
        db::init_test_database().await;
        let id = seed_event(3).await;

        let reserved = try_reserve(conn(), id, 5).await.unwrap();
        assert!(!reserved);

        let event = get_by_id(id).await.unwrap().unwrap();
        assert_eq!(event.available_tickets, 3);
    }
}

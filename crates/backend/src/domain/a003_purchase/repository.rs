use contracts::domain::a002_event::aggregate::EventId;
use contracts::domain::a003_purchase::aggregate::{Purchase, PurchaseId, PurchaseLine};
use contracts::domain::common::AggregateId;
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::shared::data::db::get_connection;

pub mod purchase_entity {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "a003_purchase")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub guest_name: String,
        pub guest_email: String,
        pub purchase_date: chrono::DateTime<chrono::Utc>,
        pub total_cost: f64,
        pub user_id: Option<String>,
        pub rating: Option<i32>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod line_entity {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "a003_purchase_line")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub purchase_id: String,
        pub event_id: String,
        pub quantity: i32,
        pub total_price: f64,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

fn to_purchase(header: purchase_entity::Model, lines: Vec<line_entity::Model>) -> Purchase {
    let id = PurchaseId::from_string(&header.id).unwrap_or_else(|_| PurchaseId::new_v4());
    let lines = lines
        .into_iter()
        .filter_map(|l| {
            let event_id = EventId::from_string(&l.event_id).ok()?;
            Some(PurchaseLine {
                purchase_id: id,
                event_id,
                quantity: l.quantity,
                total_price: l.total_price,
            })
        })
        .collect();
    Purchase {
        id,
        guest_name: header.guest_name,
        guest_email: header.guest_email,
        purchase_date: header.purchase_date,
        total_cost: header.total_cost,
        user_id: header.user_id,
        rating: header.rating,
        lines,
    }
}

/// Insert the purchase header with all its lines. Callers run this inside
/// the checkout transaction so the document appears atomically with the
/// inventory decrements.
pub async fn insert_with_lines<C: ConnectionTrait>(
    db: &C,
    purchase: &Purchase,
) -> anyhow::Result<()> {
    let header = purchase_entity::ActiveModel {
        id: Set(purchase.id.as_string()),
        guest_name: Set(purchase.guest_name.clone()),
        guest_email: Set(purchase.guest_email.clone()),
        purchase_date: Set(purchase.purchase_date),
        total_cost: Set(purchase.total_cost),
        user_id: Set(purchase.user_id.clone()),
        rating: Set(purchase.rating),
    };
    purchase_entity::Entity::insert(header).exec(db).await?;

    for line in &purchase.lines {
        let active = line_entity::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            purchase_id: Set(line.purchase_id.as_string()),
            event_id: Set(line.event_id.as_string()),
            quantity: Set(line.quantity),
            total_price: Set(line.total_price),
        };
        line_entity::Entity::insert(active).exec(db).await?;
    }

    Ok(())
}

pub async fn get_with_lines(id: Uuid) -> anyhow::Result<Option<Purchase>> {
    let header = purchase_entity::Entity::find_by_id(id.to_string())
        .one(conn())
        .await?;
    let Some(header) = header else {
        return Ok(None);
    };
    let lines = line_entity::Entity::find()
        .filter(line_entity::Column::PurchaseId.eq(id.to_string()))
        .all(conn())
        .await?;
    Ok(Some(to_purchase(header, lines)))
}

/// All purchases of one user, newest first, lines attached
pub async fn list_by_user(user_id: &str) -> anyhow::Result<Vec<Purchase>> {
    let headers = purchase_entity::Entity::find()
        .filter(purchase_entity::Column::UserId.eq(user_id))
        .order_by_desc(purchase_entity::Column::PurchaseDate)
        .all(conn())
        .await?;

    let mut result = Vec::with_capacity(headers.len());
    for header in headers {
        let lines = line_entity::Entity::find()
            .filter(line_entity::Column::PurchaseId.eq(header.id.clone()))
            .all(conn())
            .await?;
        result.push(to_purchase(header, lines));
    }
    Ok(result)
}

pub async fn set_rating(id: Uuid, rating: i32) -> anyhow::Result<bool> {
    use sea_orm::sea_query::Expr;
    let result = purchase_entity::Entity::update_many()
        .col_expr(purchase_entity::Column::Rating, Expr::value(rating))
        .filter(purchase_entity::Column::Id.eq(id.to_string()))
        .exec(conn())
        .await?;
    Ok(result.rows_affected > 0)
}

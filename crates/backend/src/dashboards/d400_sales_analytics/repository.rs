use anyhow::Result;
use sea_orm::{FromQueryResult, Statement};
use serde::{Deserialize, Serialize};

use crate::shared::data::db::get_connection;

/// Raw aggregation row: tickets sold per category
#[derive(Debug, Clone, Serialize, Deserialize, FromQueryResult)]
pub struct CategorySalesRow {
    pub category: String,
    pub tickets_sold: i64,
}

/// Raw aggregation row: revenue per calendar month
#[derive(Debug, Clone, Serialize, Deserialize, FromQueryResult)]
pub struct MonthRevenueRow {
    pub month: String,
    pub revenue: f64,
}

/// Raw aggregation row: best selling events
#[derive(Debug, Clone, Serialize, Deserialize, FromQueryResult)]
pub struct TopEventRow {
    pub title: String,
    pub tickets_sold: i64,
    pub revenue: f64,
}

/// Tickets sold per category across all purchases
pub async fn sales_by_category_all() -> Result<Vec<CategorySalesRow>> {
    let db = get_connection();

    let sql = r#"
        SELECT
            COALESCE(c.description, 'Uncategorized') AS category,
            SUM(l.quantity) AS tickets_sold
        FROM a003_purchase_line l
        JOIN a002_event e ON l.event_id = e.id
        LEFT JOIN a001_category c ON e.category_id = c.id
        GROUP BY COALESCE(c.description, 'Uncategorized')
        ORDER BY tickets_sold DESC
    "#;

    let stmt = Statement::from_sql_and_values(sea_orm::DatabaseBackend::Sqlite, sql, []);
    let results = CategorySalesRow::find_by_statement(stmt).all(db).await?;
    Ok(results)
}

/// Tickets sold per category, restricted to one organizer's events
pub async fn sales_by_category_for_organizer(organizer_id: &str) -> Result<Vec<CategorySalesRow>> {
    let db = get_connection();

    let sql = r#"
        SELECT
            COALESCE(c.description, 'Uncategorized') AS category,
            SUM(l.quantity) AS tickets_sold
        FROM a003_purchase_line l
        JOIN a002_event e ON l.event_id = e.id
        LEFT JOIN a001_category c ON e.category_id = c.id
        WHERE e.organizer_id = ?
        GROUP BY COALESCE(c.description, 'Uncategorized')
        ORDER BY tickets_sold DESC
    "#;

    let stmt = Statement::from_sql_and_values(
        sea_orm::DatabaseBackend::Sqlite,
        sql,
        [organizer_id.into()],
    );
    let results = CategorySalesRow::find_by_statement(stmt).all(db).await?;
    Ok(results)
}

/// Total purchase revenue per month, 'YYYY-MM' keys in chronological order
pub async fn revenue_by_month_all() -> Result<Vec<MonthRevenueRow>> {
    let db = get_connection();

    let sql = r#"
        SELECT
            strftime('%Y-%m', p.purchase_date) AS month,
            COALESCE(SUM(p.total_cost), 0) AS revenue
        FROM a003_purchase p
        GROUP BY strftime('%Y-%m', p.purchase_date)
        ORDER BY month
    "#;

    let stmt = Statement::from_sql_and_values(sea_orm::DatabaseBackend::Sqlite, sql, []);
    let results = MonthRevenueRow::find_by_statement(stmt).all(db).await?;
    Ok(results)
}

/// Monthly revenue over purchases that touch the organizer's events.
/// The whole purchase total counts once a single line matches.
pub async fn revenue_by_month_for_organizer(organizer_id: &str) -> Result<Vec<MonthRevenueRow>> {
    let db = get_connection();

    let sql = r#"
        SELECT
            strftime('%Y-%m', p.purchase_date) AS month,
            COALESCE(SUM(p.total_cost), 0) AS revenue
        FROM a003_purchase p
        WHERE EXISTS (
            SELECT 1
            FROM a003_purchase_line l
            JOIN a002_event e ON l.event_id = e.id
            WHERE l.purchase_id = p.id AND e.organizer_id = ?
        )
        GROUP BY strftime('%Y-%m', p.purchase_date)
        ORDER BY month
    "#;

    let stmt = Statement::from_sql_and_values(
        sea_orm::DatabaseBackend::Sqlite,
        sql,
        [organizer_id.into()],
    );
    let results = MonthRevenueRow::find_by_statement(stmt).all(db).await?;
    Ok(results)
}

/// Five best selling events by tickets sold
pub async fn top_events_all() -> Result<Vec<TopEventRow>> {
    let db = get_connection();

    let sql = r#"
        SELECT
            e.description AS title,
            SUM(l.quantity) AS tickets_sold,
            COALESCE(SUM(l.total_price), 0) AS revenue
        FROM a003_purchase_line l
        JOIN a002_event e ON l.event_id = e.id
        GROUP BY e.id
        ORDER BY tickets_sold DESC
        LIMIT 5
    "#;

    let stmt = Statement::from_sql_and_values(sea_orm::DatabaseBackend::Sqlite, sql, []);
    let results = TopEventRow::find_by_statement(stmt).all(db).await?;
    Ok(results)
}

pub async fn top_events_for_organizer(organizer_id: &str) -> Result<Vec<TopEventRow>> {
    let db = get_connection();

    let sql = r#"
        SELECT
            e.description AS title,
            SUM(l.quantity) AS tickets_sold,
            COALESCE(SUM(l.total_price), 0) AS revenue
        FROM a003_purchase_line l
        JOIN a002_event e ON l.event_id = e.id
        WHERE e.organizer_id = ?
        GROUP BY e.id
        ORDER BY tickets_sold DESC
        LIMIT 5
    "#;

    let stmt = Statement::from_sql_and_values(
        sea_orm::DatabaseBackend::Sqlite,
        sql,
        [organizer_id.into()],
    );
    let results = TopEventRow::find_by_statement(stmt).all(db).await?;
    Ok(results)
}

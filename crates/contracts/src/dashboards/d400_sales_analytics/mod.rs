//! Sales analytics payload (organizer/admin dashboard charts)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySales {
    pub category: String,

    #[serde(rename = "ticketsSold")]
    pub tickets_sold: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthRevenue {
    /// Calendar month bucket, "YYYY-MM"
    pub month: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopEvent {
    pub title: String,

    #[serde(rename = "ticketsSold")]
    pub tickets_sold: i64,

    pub revenue: f64,
}

/// Combined analytics JSON. Empty arrays when no sales exist yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsResponse {
    #[serde(rename = "salesByCategory")]
    pub sales_by_category: Vec<CategorySales>,

    #[serde(rename = "revenueByMonth")]
    pub revenue_by_month: Vec<MonthRevenue>,

    #[serde(rename = "topEvents")]
    pub top_events: Vec<TopEvent>,
}

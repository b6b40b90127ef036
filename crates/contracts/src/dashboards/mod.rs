pub mod d400_sales_analytics;
pub mod d401_user_dashboard;

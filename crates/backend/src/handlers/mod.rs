pub mod a001_category;
pub mod a002_event;
pub mod a003_purchase;
pub mod cart;
pub mod d400_sales_analytics;
pub mod d401_user_dashboard;
pub mod u101_checkout;

pub mod common;

pub mod a001_category;
pub mod a002_event;
pub mod a003_purchase;

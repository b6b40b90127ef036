//! Session cart wire types. The cart itself is ephemeral, owned by the
//! backend session store; these are its line item and view shapes.

use crate::domain::a002_event::aggregate::EventId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One cart line. Title, category, price and availability are snapshots
/// taken from the catalog at add time; the availability snapshot is
/// advisory (UI display) and never drives the checkout commit decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(rename = "eventId")]
    pub event_id: EventId,

    #[serde(rename = "eventTitle")]
    pub event_title: String,

    #[serde(rename = "categoryName")]
    pub category_name: String,

    #[serde(rename = "eventDateTime")]
    pub event_date_time: DateTime<Utc>,

    #[serde(rename = "ticketPrice")]
    pub ticket_price: f64,

    #[serde(rename = "availableTickets")]
    pub available_tickets: i32,

    pub quantity: i32,
}

impl CartItem {
    pub fn subtotal(&self) -> f64 {
        self.ticket_price * self.quantity as f64
    }
}

/// Full cart view returned to the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartView {
    /// Opaque session token; echoed so the client can persist it
    #[serde(rename = "sessionId")]
    pub session_id: String,

    pub items: Vec<CartItem>,

    /// Total number of tickets across all lines
    #[serde(rename = "cartCount")]
    pub cart_count: i32,

    #[serde(rename = "totalCost")]
    pub total_cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddToCartRequest {
    #[serde(rename = "eventId")]
    pub event_id: String,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateQuantityRequest {
    #[serde(rename = "eventId")]
    pub event_id: String,
    pub quantity: i32,
}

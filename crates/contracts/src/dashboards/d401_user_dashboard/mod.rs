//! Per-user dashboard payload: upcoming tickets, past purchases, own events

use crate::domain::a002_event::aggregate::EventView;
use crate::domain::a003_purchase::aggregate::PurchaseView;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDashboardResponse {
    /// Purchases containing at least one upcoming event, soonest first
    #[serde(rename = "myTickets")]
    pub my_tickets: Vec<PurchaseView>,

    /// Purchases whose events have all passed, newest first
    #[serde(rename = "purchaseHistory")]
    pub purchase_history: Vec<PurchaseView>,

    /// Events owned by the caller; empty unless organizer or admin
    #[serde(rename = "myEvents")]
    pub my_events: Vec<EventView>,
}

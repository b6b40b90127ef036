use crate::domain::a002_event::aggregate::EventId;
use crate::domain::common::AggregateId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ID Type
// ============================================================================

/// Unique identifier of a purchase document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PurchaseId(pub Uuid);

impl PurchaseId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }

    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for PurchaseId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(PurchaseId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Document
// ============================================================================

/// Line of a purchase document. One distinct event per line; `total_price`
/// is fixed at commit time and never re-reads later catalog price changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseLine {
    #[serde(rename = "purchaseId")]
    pub purchase_id: PurchaseId,

    #[serde(rename = "eventId")]
    pub event_id: EventId,

    pub quantity: i32,

    #[serde(rename = "totalPrice")]
    pub total_price: f64,
}

/// Purchase document, created exactly once per successful checkout.
/// Immutable after commit except for the optional rating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    pub id: PurchaseId,

    #[serde(rename = "guestName")]
    pub guest_name: String,

    #[serde(rename = "guestEmail")]
    pub guest_email: String,

    #[serde(rename = "purchaseDate")]
    pub purchase_date: DateTime<Utc>,

    #[serde(rename = "totalCost")]
    pub total_cost: f64,

    /// Null for guest checkout
    #[serde(rename = "userId")]
    pub user_id: Option<String>,

    /// 1..=5, settable post-purchase by the owning user
    pub rating: Option<i32>,

    pub lines: Vec<PurchaseLine>,
}

impl Purchase {
    pub fn to_string_id(&self) -> String {
        self.id.as_string()
    }

    /// Sum of committed line totals; equals `total_cost` by invariant
    pub fn lines_total(&self) -> f64 {
        self.lines.iter().map(|l| l.total_price).sum()
    }
}

// ============================================================================
// Views / DTOs
// ============================================================================

/// Purchase line enriched with event fields for presentation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseLineView {
    #[serde(rename = "eventId")]
    pub event_id: EventId,

    #[serde(rename = "eventTitle")]
    pub event_title: String,

    #[serde(rename = "eventDateTime")]
    pub event_date_time: DateTime<Utc>,

    #[serde(rename = "categoryName")]
    pub category_name: Option<String>,

    pub quantity: i32,

    #[serde(rename = "totalPrice")]
    pub total_price: f64,
}

/// Purchase with enriched lines, as returned to the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseView {
    pub id: PurchaseId,

    #[serde(rename = "guestName")]
    pub guest_name: String,

    #[serde(rename = "guestEmail")]
    pub guest_email: String,

    #[serde(rename = "purchaseDate")]
    pub purchase_date: DateTime<Utc>,

    #[serde(rename = "totalCost")]
    pub total_cost: f64,

    #[serde(rename = "userId")]
    pub user_id: Option<String>,

    pub rating: Option<i32>,

    pub lines: Vec<PurchaseLineView>,
}

/// Request body for rating a past purchase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateRequest {
    pub rating: i32,
}

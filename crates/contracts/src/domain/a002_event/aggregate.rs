use crate::domain::a001_category::aggregate::CategoryId;
use crate::domain::common::{AggregateId, BaseAggregate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ID Type
// ============================================================================

/// Unique identifier of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl EventId {
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

impl AggregateId for EventId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(EventId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Event in the catalog. `base.description` is the event title;
/// `available_tickets` is the live inventory count, decremented only by
/// successful checkout commits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(flatten)]
    pub base: BaseAggregate<EventId>,

    #[serde(rename = "dateTime")]
    pub date_time: DateTime<Utc>,

    #[serde(rename = "ticketPrice")]
    pub ticket_price: f64,

    #[serde(rename = "availableTickets")]
    pub available_tickets: i32,

    #[serde(rename = "categoryId")]
    pub category_id: Option<CategoryId>,

    /// Owner reference, null for unowned events (organizer account removed)
    #[serde(rename = "organizerId")]
    pub organizer_id: Option<String>,

    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
}

impl Event {
    /// Create a new event for insertion
    #[allow(clippy::too_many_arguments)]
    pub fn new_for_insert(
        code: String,
        title: String,
        date_time: DateTime<Utc>,
        ticket_price: f64,
        available_tickets: i32,
        category_id: Option<CategoryId>,
        organizer_id: Option<String>,
        image_url: Option<String>,
    ) -> Self {
        let base = BaseAggregate::new(EventId::new_v4(), code, title);
        Self {
            base,
            date_time,
            ticket_price,
            available_tickets,
            category_id,
            organizer_id,
            image_url,
        }
    }

    pub fn to_string_id(&self) -> String {
        self.base.id.as_string()
    }

    pub fn title(&self) -> &str {
        &self.base.description
    }

    pub fn is_sold_out(&self) -> bool {
        self.available_tickets <= 0
    }

    /// Apply DTO fields. The organizer reference is never taken from the
    /// DTO: ownership is stamped at creation and preserved on update.
    pub fn update(&mut self, dto: &EventDto) {
        if let Some(code) = &dto.code {
            self.base.code = code.clone();
        }
        self.base.description = dto.title.clone();
        self.base.comment = dto.comment.clone();
        self.date_time = dto.date_time;
        self.ticket_price = dto.ticket_price;
        self.available_tickets = dto.available_tickets;
        self.category_id = dto
            .category_id
            .as_deref()
            .and_then(|s| CategoryId::from_string(s).ok());
        self.image_url = dto.image_url.clone();
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.base.description.trim().is_empty() {
            return Err("Event title cannot be empty".into());
        }
        if self.ticket_price < 0.0 || !self.ticket_price.is_finite() {
            return Err("Ticket price must be non-negative".into());
        }
        if self.available_tickets < 0 {
            return Err("Available tickets must be non-negative".into());
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.base.touch();
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// DTO for creating/updating an event
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EventDto {
    pub id: Option<String>,
    pub code: Option<String>,
    pub title: String,

    #[serde(rename = "dateTime")]
    pub date_time: DateTime<Utc>,

    #[serde(rename = "ticketPrice")]
    pub ticket_price: f64,

    #[serde(rename = "availableTickets")]
    pub available_tickets: i32,

    #[serde(rename = "categoryId")]
    pub category_id: Option<String>,

    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,

    pub comment: Option<String>,
}

/// Sort order for the public event list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventListSort {
    #[default]
    Default,
    Title,
    Date,
    Price,
}

/// Query parameters for the public event list
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EventListQuery {
    pub search: Option<String>,

    #[serde(rename = "categoryFilter")]
    pub category_filter: Option<String>,

    #[serde(rename = "startDate")]
    pub start_date: Option<DateTime<Utc>>,

    #[serde(rename = "endDate")]
    pub end_date: Option<DateTime<Utc>>,

    #[serde(rename = "sortOrder")]
    pub sort_order: Option<EventListSort>,
}

/// Event enriched with its category name, for list/detail views
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventView {
    #[serde(flatten)]
    pub event: Event,

    #[serde(rename = "categoryName")]
    pub category_name: Option<String>,
}

/// Admin catalog overview: totals plus events running low on tickets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventOverview {
    #[serde(rename = "totalEvents")]
    pub total_events: i64,

    #[serde(rename = "totalCategories")]
    pub total_categories: i64,

    #[serde(rename = "lowTicketEvents")]
    pub low_ticket_events: Vec<EventView>,
}

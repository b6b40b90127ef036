use crate::domain::common::{AggregateId, BaseAggregate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ID Type
// ============================================================================

/// Unique identifier of an event category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryId(pub Uuid);

impl CategoryId {
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

impl AggregateId for CategoryId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(CategoryId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Event category (catalog grouping, `base.description` is the display name)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    #[serde(flatten)]
    pub base: BaseAggregate<CategoryId>,
}

impl Category {
    /// Create a new category for insertion
    pub fn new_for_insert(code: String, name: String, comment: Option<String>) -> Self {
        let mut base = BaseAggregate::new(CategoryId::new_v4(), code, name);
        base.comment = comment;
        Self { base }
    }

    pub fn to_string_id(&self) -> String {
        self.base.id.as_string()
    }

    /// Apply DTO fields
    pub fn update(&mut self, dto: &CategoryDto) {
        if let Some(code) = &dto.code {
            self.base.code = code.clone();
        }
        self.base.description = dto.name.clone();
        self.base.comment = dto.comment.clone();
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.base.description.trim().is_empty() {
            return Err("Category name cannot be empty".into());
        }
        if self.base.code.trim().is_empty() {
            return Err("Category code cannot be empty".into());
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

/// DTO for creating/updating a category
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CategoryDto {
    pub id: Option<String>,
    pub code: Option<String>,
    pub name: String,
    pub comment: Option<String>,
}

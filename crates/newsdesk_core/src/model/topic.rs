//! Topic entity.

use super::{require_text, ValidationError};
use serde::{Deserialize, Serialize};

/// Storage-assigned topic identifier.
pub type TopicId = i64;

/// A topic that news items can be filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: Option<TopicId>,
    pub title: String,
    /// Epoch milliseconds, set by the repository on insert.
    #[serde(default)]
    pub created_at: i64,
    /// Epoch milliseconds, refreshed by the repository on every write.
    #[serde(default)]
    pub updated_at: i64,
}

impl Topic {
    /// Creates an unsaved topic.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            created_at: 0,
            updated_at: 0,
        }
    }

    /// Checks required fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("topic", "title", &self.title)
    }
}

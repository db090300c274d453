//! News entity and its publication status.
//!
//! # Invariants
//! - `status` is persisted as its lowercase text form (`draft`, `published`,
//!   `deleted`); any other stored text is a mapping error on read.

use super::{require_text, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Storage-assigned news identifier.
pub type NewsId = i64;

/// Publication state of a news item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsStatus {
    /// Written but not visible to readers.
    #[default]
    Draft,
    /// Visible to readers.
    Published,
    /// Withdrawn; kept for history.
    Deleted,
}

impl NewsStatus {
    /// Every accepted text form, in declaration order.
    pub const ALL: &'static [&'static str] = &["draft", "published", "deleted"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Deleted => "deleted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "published" => Some(Self::Published),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }
}

impl Display for NewsStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A news article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct News {
    pub id: Option<NewsId>,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub status: NewsStatus,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl News {
    /// Creates an unsaved draft.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            content: content.into(),
            status: NewsStatus::Draft,
            created_at: 0,
            updated_at: 0,
        }
    }

    /// Returns a copy with the given status.
    pub fn with_status(mut self, status: NewsStatus) -> Self {
        self.status = status;
        self
    }

    /// Checks required fields. Content may be empty; title may not.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("news", "title", &self.title)
    }
}

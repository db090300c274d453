//! Domain model for news items and topics.
//!
//! # Responsibility
//! - Define the entity records exchanged with repository callers.
//! - Own field-level validation shared by insert and update paths.
//!
//! # Invariants
//! - `id` is `None` until storage assigns one on insert.
//! - Timestamps are Unix epoch milliseconds and are owned by the repository.
//! - `title` must be non-blank for every persisted record.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod news;
pub mod topic;

/// Field validation failure raised before any SQL is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is empty or whitespace-only.
    BlankField {
        entity: &'static str,
        field: &'static str,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField { entity, field } => {
                write!(f, "{entity}.{field} is required and cannot be blank")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(
    entity: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField { entity, field });
    }
    Ok(())
}

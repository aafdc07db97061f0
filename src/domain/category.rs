//! Category domain model.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum length of a category name, in characters.
pub const NAME_MAX_LENGTH: usize = 30;

/// Maximum length of a category description, in characters.
pub const DESCRIPTION_MAX_LENGTH: usize = 100;

/// Store-assigned identifier for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CategoryId(i64);

impl CategoryId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for CategoryId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// A persisted category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
}

/// A validated category that has not been inserted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    pub description: String,
}

impl Category {
    /// Attaches a store-assigned identifier to validated creation data.
    #[must_use]
    pub fn from_new(id: CategoryId, new_category: NewCategory) -> Self {
        Self {
            id,
            name: new_category.name,
            description: new_category.description,
        }
    }
}

/// Reasons a category cannot be created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateCategoryError {
    #[error("Name field is blank")]
    BlankName,

    #[error("Name field is too long")]
    NameTooLong { length: usize },

    #[error("Description field is too long")]
    DescriptionTooLong { length: usize },
}

/// Counts characters the way the length limits are expressed.
#[must_use]
pub fn char_length(text: &str) -> usize {
    text.chars().count()
}

impl NewCategory {
    /// Validates creation input.
    ///
    /// # Errors
    ///
    /// Returns [`CreateCategoryError`] when the name is blank or either field
    /// exceeds its length limit.
    pub fn validate(
        name: String,
        description: Option<String>,
    ) -> Result<Self, CreateCategoryError> {
        if name.trim().is_empty() {
            return Err(CreateCategoryError::BlankName);
        }
        let length = char_length(&name);
        if length > NAME_MAX_LENGTH {
            return Err(CreateCategoryError::NameTooLong { length });
        }

        let description = description.unwrap_or_default();
        let length = char_length(&description);
        if length > DESCRIPTION_MAX_LENGTH {
            return Err(CreateCategoryError::DescriptionTooLong { length });
        }

        Ok(Self { name, description })
    }
}

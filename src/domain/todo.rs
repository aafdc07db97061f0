//! Todo domain model.
//!
//! This module contains the `Todo` entity, its value objects, and the
//! validation applied when a new todo is created.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::category::CategoryId;

// =============================================================================
// Value Objects - Newtypes
// =============================================================================

/// Store-assigned identifier for a todo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TodoId(i64);

impl TodoId {
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

impl std::fmt::Display for TodoId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Unix seconds of `0001-01-01T00:00:00Z`.
const ZERO_TIME_UNIX_SECONDS: i64 = -62_135_596_800;

/// A timestamp wrapper for `DateTime<Utc>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a `Timestamp` from a `DateTime<Utc>`.
    ///
    /// This is a pure function.
    #[must_use]
    pub const fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }

    /// Returns the inner `DateTime<Utc>`.
    #[must_use]
    pub const fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the current time as a `Timestamp`.
    ///
    /// **Note**: This is an impure function (side effect: system clock).
    /// Handlers read the clock once and pass the value down.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Returns `true` if this timestamp lies strictly after `other`.
    #[must_use]
    pub fn is_after(&self, other: &Self) -> bool {
        self.0 > other.0
    }

    /// Returns `true` for the zero time, `0001-01-01T00:00:00Z`, or the
    /// earliest representable instant. Clients send either for "no date".
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == DateTime::<Utc>::MIN_UTC
            || (self.0.timestamp() == ZERO_TIME_UNIX_SECONDS
                && self.0.timestamp_subsec_nanos() == 0)
    }

    /// Formats the timestamp as an RFC 3339 string.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0.format("%Y-%m-%d %H:%M:%S UTC"))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}

/// The priority of a todo, always within `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Priority(u8);

impl Priority {
    /// Lowest accepted priority.
    pub const MIN: i64 = 1;
    /// Highest accepted priority.
    pub const MAX: i64 = 5;

    /// Creates a priority, rejecting values outside `1..=5`.
    ///
    /// # Errors
    ///
    /// Returns [`PriorityOutOfRange`] when `value` is outside the accepted range.
    pub fn new(value: i64) -> Result<Self, PriorityOutOfRange> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(PriorityOutOfRange(value));
        }
        u8::try_from(value)
            .map(Self)
            .map_err(|_| PriorityOutOfRange(value))
    }

    /// Returns the numeric value of the priority.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0 as i64
    }
}

impl TryFrom<i64> for Priority {
    type Error = PriorityOutOfRange;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Priority> for i64 {
    fn from(priority: Priority) -> Self {
        priority.value()
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// A priority value outside `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("priority {0} is outside 1-5")]
pub struct PriorityOutOfRange(pub i64);

// =============================================================================
// Todo
// =============================================================================

/// A persisted todo item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Store-assigned identifier.
    pub id: TodoId,
    /// Short title, never blank.
    pub title: String,
    /// Body text, never blank.
    pub content: String,
    /// Priority in `1..=5`.
    pub priority: Priority,
    /// Creation time, immutable after insert.
    pub created_at: Timestamp,
    /// Deadline.
    pub due_date: Timestamp,
    /// Completion flag.
    pub is_done: bool,
    /// Owning category. Only checked against the category table at creation.
    pub category_id: CategoryId,
}

impl Todo {
    /// Attaches a store-assigned identifier to validated creation data.
    ///
    /// This is a pure function.
    #[must_use]
    pub fn from_new(id: TodoId, new_todo: NewTodo) -> Self {
        Self {
            id,
            title: new_todo.title,
            content: new_todo.content,
            priority: new_todo.priority,
            created_at: new_todo.created_at,
            due_date: new_todo.due_date,
            is_done: new_todo.is_done,
            category_id: new_todo.category_id,
        }
    }
}

// =============================================================================
// Creation
// =============================================================================

/// A validated todo that has not been inserted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub content: String,
    pub priority: Priority,
    pub created_at: Timestamp,
    pub due_date: Timestamp,
    pub is_done: bool,
    pub category_id: CategoryId,
}

/// Raw creation input, as decoded from a request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoDraft {
    pub title: String,
    pub content: String,
    pub priority: i64,
    pub due_date: Option<Timestamp>,
    pub category_id: i64,
}

/// Reasons a todo cannot be created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateTodoError {
    #[error("Title is blank")]
    BlankTitle,

    #[error("Content is blank")]
    BlankContent,

    #[error("Priority must be between 1-5")]
    InvalidPriority(i64),

    #[error("Due date is required")]
    MissingDueDate,

    #[error("Due date can't be in the past")]
    DueDateInPast,
}

impl NewTodo {
    /// Validates a draft against the creation rules.
    ///
    /// Creation sets `created_at` to `now` and always starts not-done. The
    /// category reference is checked separately because it needs the store.
    ///
    /// # Errors
    ///
    /// Returns the first [`CreateTodoError`] encountered, in field order.
    pub fn validate(draft: TodoDraft, now: Timestamp) -> Result<Self, CreateTodoError> {
        if draft.title.trim().is_empty() {
            return Err(CreateTodoError::BlankTitle);
        }
        if draft.content.trim().is_empty() {
            return Err(CreateTodoError::BlankContent);
        }
        let priority = Priority::new(draft.priority)
            .map_err(|PriorityOutOfRange(value)| CreateTodoError::InvalidPriority(value))?;
        let due_date = draft.due_date.ok_or(CreateTodoError::MissingDueDate)?;
        if due_date < now {
            return Err(CreateTodoError::DueDateInPast);
        }

        Ok(Self {
            title: draft.title,
            content: draft.content,
            priority,
            created_at: now,
            due_date,
            is_done: false,
            category_id: CategoryId::new(draft.category_id),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

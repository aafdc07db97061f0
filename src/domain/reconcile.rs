//! Partial-update reconciliation.
//!
//! Merges a partially populated patch into an existing record, field by
//! field, and reports which fields changed. Reconciliation is pure: the
//! caller supplies the current time and persists the result.
//!
//! # Presence rules
//!
//! Every patch field is an `Option`; a key missing from the request body (or
//! sent as `null`) is absent. On top of that, the following supplied values
//! also count as absent:
//!
//! - blank text (empty after trimming whitespace)
//! - a priority of `0`
//! - a due date equal to the zero time (`0001-01-01T00:00:00Z`)
//! - a category id of `0`
//!
//! Supplied values are validated before anything is merged, so a rejected
//! patch never leaves a half-applied record behind.

use thiserror::Error;

use super::category::{Category, CategoryId, DESCRIPTION_MAX_LENGTH, NAME_MAX_LENGTH, char_length};
use super::change::{CategoryField, ChangeSet, Field, TodoField};
use super::todo::{Priority, PriorityOutOfRange, Timestamp, Todo};

// =============================================================================
// Patches
// =============================================================================

/// A partial update for a todo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub priority: Option<i64>,
    pub due_date: Option<Timestamp>,
    pub is_done: Option<bool>,
    pub category_id: Option<i64>,
}

/// A partial update for a category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

// =============================================================================
// Result and Errors
// =============================================================================

/// Outcome of a successful reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled<T, F: Field> {
    /// The existing record with every supplied field applied.
    pub merged: T,
    /// Fields the patch modified. Never empty.
    pub changes: ChangeSet<F>,
}

impl<T, F: Field> Reconciled<T, F> {
    /// Renders the change summary, e.g. `"priority, is_done updated!"`.
    #[must_use]
    pub fn summary(&self) -> String {
        self.changes.summary().unwrap_or_default()
    }
}

/// Reasons a patch is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error("Priority must be between 1-5")]
    InvalidPriority(i64),

    #[error("Due date can't be in the past")]
    DueDateInPast,

    #[error("Name is too long")]
    NameTooLong { length: usize },

    #[error("Description is too long")]
    DescriptionTooLong { length: usize },

    #[error("No fields provided for update")]
    NoFieldsProvided,
}

// =============================================================================
// Presence Helpers
// =============================================================================

/// Returns the supplied text unless it is absent or blank.
fn supplied_text(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

/// Returns the supplied number unless it is absent or zero.
fn supplied_nonzero(value: Option<i64>) -> Option<i64> {
    value.filter(|number| *number != 0)
}

/// Returns the supplied due date unless it is absent or the zero time.
fn supplied_due_date(value: Option<Timestamp>) -> Option<Timestamp> {
    value.filter(|due_date| !due_date.is_zero())
}

fn check_length(
    value: Option<&str>,
    limit: usize,
    error: fn(usize) -> ReconcileError,
) -> Result<(), ReconcileError> {
    match value.map(char_length) {
        Some(length) if length > limit => Err(error(length)),
        _ => Ok(()),
    }
}

// =============================================================================
// Todo
// =============================================================================

/// Reconciles a todo patch against the persisted todo.
///
/// `title`, `content`, `priority`, `due_date` and `category_id` are marked
/// changed whenever they are supplied; `is_done` only when the supplied value
/// differs from the stored one.
///
/// This is a pure function.
///
/// # Errors
///
/// - [`ReconcileError::InvalidPriority`] for a non-zero priority outside `1..=5`
/// - [`ReconcileError::DueDateInPast`] for a due date not strictly after `now`
/// - [`ReconcileError::NoFieldsProvided`] when nothing would change
pub fn reconcile_todo(
    existing: &Todo,
    patch: &TodoPatch,
    now: &Timestamp,
) -> Result<Reconciled<Todo, TodoField>, ReconcileError> {
    let priority = supplied_nonzero(patch.priority)
        .map(Priority::new)
        .transpose()
        .map_err(|PriorityOutOfRange(value)| ReconcileError::InvalidPriority(value))?;

    let due_date = supplied_due_date(patch.due_date);
    if due_date.is_some_and(|due_date| !due_date.is_after(now)) {
        return Err(ReconcileError::DueDateInPast);
    }

    let mut merged = existing.clone();
    let mut changes = ChangeSet::new();

    if let Some(title) = supplied_text(patch.title.as_deref()) {
        merged.title = title.to_string();
        changes.mark(TodoField::Title);
    }
    if let Some(content) = supplied_text(patch.content.as_deref()) {
        merged.content = content.to_string();
        changes.mark(TodoField::Content);
    }
    if let Some(priority) = priority {
        merged.priority = priority;
        changes.mark(TodoField::Priority);
    }
    if let Some(due_date) = due_date {
        merged.due_date = due_date;
        changes.mark(TodoField::DueDate);
    }
    if let Some(is_done) = patch.is_done {
        if is_done != existing.is_done {
            changes.mark(TodoField::IsDone);
        }
        merged.is_done = is_done;
    }
    if let Some(category_id) = supplied_nonzero(patch.category_id) {
        merged.category_id = CategoryId::new(category_id);
        changes.mark(TodoField::CategoryId);
    }

    if changes.is_empty() {
        return Err(ReconcileError::NoFieldsProvided);
    }

    Ok(Reconciled { merged, changes })
}

// =============================================================================
// Category
// =============================================================================

/// Reconciles a category patch against the persisted category.
///
/// Length limits apply to every supplied value, blank or not, and are
/// checked before anything is merged.
///
/// This is a pure function.
///
/// # Errors
///
/// - [`ReconcileError::NameTooLong`] for a name over 30 characters
/// - [`ReconcileError::DescriptionTooLong`] for a description over 100 characters
/// - [`ReconcileError::NoFieldsProvided`] when nothing would change
pub fn reconcile_category(
    existing: &Category,
    patch: &CategoryPatch,
) -> Result<Reconciled<Category, CategoryField>, ReconcileError> {
    check_length(patch.name.as_deref(), NAME_MAX_LENGTH, |length| {
        ReconcileError::NameTooLong { length }
    })?;
    check_length(
        patch.description.as_deref(),
        DESCRIPTION_MAX_LENGTH,
        |length| ReconcileError::DescriptionTooLong { length },
    )?;

    let mut merged = existing.clone();
    let mut changes = ChangeSet::new();

    if let Some(name) = supplied_text(patch.name.as_deref()) {
        merged.name = name.to_string();
        changes.mark(CategoryField::Name);
    }
    if let Some(description) = supplied_text(patch.description.as_deref()) {
        merged.description = description.to_string();
        changes.mark(CategoryField::Description);
    }

    if changes.is_empty() {
        return Err(ReconcileError::NoFieldsProvided);
    }

    Ok(Reconciled { merged, changes })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TodoId;
    use chrono::{Duration, TimeZone, Utc};
    use rstest::{fixture, rstest};

    #[fixture]
    fn now() -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap())
    }

    fn days_from(now: &Timestamp, days: i64) -> Timestamp {
        Timestamp::from_datetime(*now.as_datetime() + Duration::days(days))
    }

    #[fixture]
    fn existing_todo(now: Timestamp) -> Todo {
        Todo {
            id: TodoId::new(1),
            title: "A".to_string(),
            content: "B".to_string(),
            priority: Priority::new(2).unwrap(),
            created_at: days_from(&now, -2),
            due_date: days_from(&now, 1),
            is_done: false,
            category_id: CategoryId::new(5),
        }
    }

    #[fixture]
    fn existing_category() -> Category {
        Category {
            id: CategoryId::new(3),
            name: "Work".to_string(),
            description: "Office things".to_string(),
        }
    }

    // -------------------------------------------------------------------------
    // Todo
    // -------------------------------------------------------------------------

    #[rstest]
    fn test_priority_and_done_scenario(existing_todo: Todo, now: Timestamp) {
        let patch = TodoPatch {
            priority: Some(4),
            is_done: Some(true),
            ..TodoPatch::default()
        };

        let reconciled = reconcile_todo(&existing_todo, &patch, &now).unwrap();

        let expected = Todo {
            priority: Priority::new(4).unwrap(),
            is_done: true,
            ..existing_todo
        };
        assert_eq!(reconciled.merged, expected);
        assert_eq!(
            reconciled.changes,
            [TodoField::Priority, TodoField::IsDone].into_iter().collect()
        );
        assert_eq!(reconciled.summary(), "priority, is_done updated!");
    }

    #[rstest]
    fn test_empty_patch_is_rejected(existing_todo: Todo, now: Timestamp) {
        let result = reconcile_todo(&existing_todo, &TodoPatch::default(), &now);
        assert_eq!(result, Err(ReconcileError::NoFieldsProvided));
    }

    #[rstest]
    fn test_empty_patch_is_rejected_for_done_todo(existing_todo: Todo, now: Timestamp) {
        let done = Todo {
            is_done: true,
            ..existing_todo
        };
        let result = reconcile_todo(&done, &TodoPatch::default(), &now);
        assert_eq!(result, Err(ReconcileError::NoFieldsProvided));
    }

    /// An omitted `is_done` keeps the stored flag instead of resetting it to
    /// `false`.
    #[rstest]
    fn test_omitted_is_done_keeps_existing_value(existing_todo: Todo, now: Timestamp) {
        let done = Todo {
            is_done: true,
            ..existing_todo
        };
        let patch = TodoPatch {
            title: Some("Renamed".to_string()),
            ..TodoPatch::default()
        };

        let reconciled = reconcile_todo(&done, &patch, &now).unwrap();

        assert!(reconciled.merged.is_done);
        assert_eq!(reconciled.summary(), "title updated!");
    }

    #[rstest]
    fn test_is_done_equal_to_stored_value_is_not_a_change(existing_todo: Todo, now: Timestamp) {
        let patch = TodoPatch {
            is_done: Some(false),
            ..TodoPatch::default()
        };
        let result = reconcile_todo(&existing_todo, &patch, &now);
        assert_eq!(result, Err(ReconcileError::NoFieldsProvided));
    }

    #[rstest]
    fn test_is_done_can_be_cleared(existing_todo: Todo, now: Timestamp) {
        let done = Todo {
            is_done: true,
            ..existing_todo
        };
        let patch = TodoPatch {
            is_done: Some(false),
            ..TodoPatch::default()
        };

        let reconciled = reconcile_todo(&done, &patch, &now).unwrap();

        assert!(!reconciled.merged.is_done);
        assert_eq!(reconciled.summary(), "is_done updated!");
    }

    #[rstest]
    fn test_priority_zero_is_treated_as_absent(existing_todo: Todo, now: Timestamp) {
        let patch = TodoPatch {
            priority: Some(0),
            title: Some("New".to_string()),
            ..TodoPatch::default()
        };

        let reconciled = reconcile_todo(&existing_todo, &patch, &now).unwrap();

        assert_eq!(reconciled.merged.priority, existing_todo.priority);
        assert!(!reconciled.changes.contains(TodoField::Priority));
    }

    #[rstest]
    fn test_priority_zero_alone_is_rejected_as_empty(existing_todo: Todo, now: Timestamp) {
        let patch = TodoPatch {
            priority: Some(0),
            ..TodoPatch::default()
        };
        assert_eq!(
            reconcile_todo(&existing_todo, &patch, &now),
            Err(ReconcileError::NoFieldsProvided)
        );
    }

    #[rstest]
    #[case(6)]
    #[case(-1)]
    #[case(100)]
    fn test_priority_out_of_range_fails_whole_patch(
        existing_todo: Todo,
        now: Timestamp,
        #[case] priority: i64,
    ) {
        let patch = TodoPatch {
            title: Some("Would change".to_string()),
            priority: Some(priority),
            ..TodoPatch::default()
        };
        assert_eq!(
            reconcile_todo(&existing_todo, &patch, &now),
            Err(ReconcileError::InvalidPriority(priority))
        );
    }

    #[rstest]
    #[case(0)]
    #[case(-1)]
    #[case(-30)]
    fn test_due_date_not_in_future_fails(
        existing_todo: Todo,
        now: Timestamp,
        #[case] offset_days: i64,
    ) {
        let patch = TodoPatch {
            due_date: Some(days_from(&now, offset_days)),
            is_done: Some(true),
            ..TodoPatch::default()
        };
        assert_eq!(
            reconcile_todo(&existing_todo, &patch, &now),
            Err(ReconcileError::DueDateInPast)
        );
    }

    #[rstest]
    fn test_future_due_date_replaces_existing(existing_todo: Todo, now: Timestamp) {
        let due_date = days_from(&now, 10);
        let patch = TodoPatch {
            due_date: Some(due_date),
            ..TodoPatch::default()
        };

        let reconciled = reconcile_todo(&existing_todo, &patch, &now).unwrap();

        assert_eq!(reconciled.merged.due_date, due_date);
        assert_eq!(reconciled.summary(), "due_date updated!");
    }

    #[rstest]
    fn test_zero_due_date_is_treated_as_absent(existing_todo: Todo, now: Timestamp) {
        let zero = Timestamp::from_datetime(Utc.with_ymd_and_hms(1, 1, 1, 0, 0, 0).unwrap());
        let patch = TodoPatch {
            due_date: Some(zero),
            title: Some("Z".to_string()),
            ..TodoPatch::default()
        };

        let reconciled = reconcile_todo(&existing_todo, &patch, &now).unwrap();

        assert_eq!(reconciled.merged.due_date, existing_todo.due_date);
        assert_eq!(reconciled.summary(), "title updated!");
    }

    #[rstest]
    fn test_zero_due_date_alone_is_rejected_as_empty(existing_todo: Todo, now: Timestamp) {
        let patch = TodoPatch {
            due_date: Some(Timestamp::from_datetime(chrono::DateTime::<Utc>::MIN_UTC)),
            ..TodoPatch::default()
        };
        assert_eq!(
            reconcile_todo(&existing_todo, &patch, &now),
            Err(ReconcileError::NoFieldsProvided)
        );
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\n\t")]
    fn test_blank_text_is_treated_as_absent(
        existing_todo: Todo,
        now: Timestamp,
        #[case] blank: &str,
    ) {
        let patch = TodoPatch {
            title: Some(blank.to_string()),
            content: Some(blank.to_string()),
            ..TodoPatch::default()
        };
        assert_eq!(
            reconcile_todo(&existing_todo, &patch, &now),
            Err(ReconcileError::NoFieldsProvided)
        );
    }

    #[rstest]
    fn test_supplied_text_is_kept_verbatim(existing_todo: Todo, now: Timestamp) {
        let patch = TodoPatch {
            content: Some("  padded  ".to_string()),
            ..TodoPatch::default()
        };
        let reconciled = reconcile_todo(&existing_todo, &patch, &now).unwrap();
        assert_eq!(reconciled.merged.content, "  padded  ");
    }

    #[rstest]
    fn test_same_title_is_still_reported(existing_todo: Todo, now: Timestamp) {
        let patch = TodoPatch {
            title: Some(existing_todo.title.clone()),
            ..TodoPatch::default()
        };
        let reconciled = reconcile_todo(&existing_todo, &patch, &now).unwrap();
        assert_eq!(reconciled.summary(), "title updated!");
    }

    #[rstest]
    fn test_category_zero_is_absent_and_others_are_not_checked(
        existing_todo: Todo,
        now: Timestamp,
    ) {
        let absent = TodoPatch {
            category_id: Some(0),
            ..TodoPatch::default()
        };
        assert_eq!(
            reconcile_todo(&existing_todo, &absent, &now),
            Err(ReconcileError::NoFieldsProvided)
        );

        let dangling = TodoPatch {
            category_id: Some(9_999),
            ..TodoPatch::default()
        };
        let reconciled = reconcile_todo(&existing_todo, &dangling, &now).unwrap();
        assert_eq!(reconciled.merged.category_id, CategoryId::new(9_999));
        assert_eq!(reconciled.summary(), "category_id updated!");
    }

    #[rstest]
    fn test_all_fields_summary_and_immutable_fields(existing_todo: Todo, now: Timestamp) {
        let patch = TodoPatch {
            title: Some("T".to_string()),
            content: Some("C".to_string()),
            priority: Some(5),
            due_date: Some(days_from(&now, 3)),
            is_done: Some(true),
            category_id: Some(8),
        };

        let reconciled = reconcile_todo(&existing_todo, &patch, &now).unwrap();

        assert_eq!(
            reconciled.summary(),
            "title, content, priority, due_date, is_done, category_id updated!"
        );
        assert_eq!(reconciled.merged.id, existing_todo.id);
        assert_eq!(reconciled.merged.created_at, existing_todo.created_at);
    }

    #[rstest]
    fn test_merged_record_is_idempotent(existing_todo: Todo, now: Timestamp) {
        let patch = TodoPatch {
            content: Some("Changed".to_string()),
            is_done: Some(true),
            ..TodoPatch::default()
        };
        let reconciled = reconcile_todo(&existing_todo, &patch, &now).unwrap();

        assert_eq!(
            reconcile_todo(&reconciled.merged, &TodoPatch::default(), &now),
            Err(ReconcileError::NoFieldsProvided)
        );
    }

    // -------------------------------------------------------------------------
    // Category
    // -------------------------------------------------------------------------

    #[rstest]
    fn test_category_name_at_limit_is_accepted(existing_category: Category) {
        let name = "x".repeat(30);
        let patch = CategoryPatch {
            name: Some(name.clone()),
            ..CategoryPatch::default()
        };

        let reconciled = reconcile_category(&existing_category, &patch).unwrap();

        assert_eq!(reconciled.merged.name, name);
        assert_eq!(reconciled.summary(), "name updated!");
    }

    #[rstest]
    fn test_category_name_over_limit_is_rejected(existing_category: Category) {
        let patch = CategoryPatch {
            name: Some("x".repeat(31)),
            description: Some("fine".to_string()),
        };
        assert_eq!(
            reconcile_category(&existing_category, &patch),
            Err(ReconcileError::NameTooLong { length: 31 })
        );
    }

    #[rstest]
    fn test_category_description_over_limit_is_rejected(existing_category: Category) {
        let patch = CategoryPatch {
            name: Some("Fine".to_string()),
            description: Some("d".repeat(101)),
        };
        assert_eq!(
            reconcile_category(&existing_category, &patch),
            Err(ReconcileError::DescriptionTooLong { length: 101 })
        );
    }

    #[rstest]
    fn test_category_blank_over_limit_is_still_rejected(existing_category: Category) {
        let patch = CategoryPatch {
            name: Some(" ".repeat(31)),
            ..CategoryPatch::default()
        };
        assert_eq!(
            reconcile_category(&existing_category, &patch),
            Err(ReconcileError::NameTooLong { length: 31 })
        );
    }

    #[rstest]
    fn test_category_description_only(existing_category: Category) {
        let patch = CategoryPatch {
            name: Some("  ".to_string()),
            description: Some("Home things".to_string()),
        };

        let reconciled = reconcile_category(&existing_category, &patch).unwrap();

        assert_eq!(reconciled.merged.name, existing_category.name);
        assert_eq!(reconciled.merged.description, "Home things");
        assert_eq!(reconciled.summary(), "description updated!");
    }

    #[rstest]
    fn test_category_both_fields(existing_category: Category) {
        let patch = CategoryPatch {
            name: Some("Home".to_string()),
            description: Some("Chores".to_string()),
        };
        let reconciled = reconcile_category(&existing_category, &patch).unwrap();
        assert_eq!(reconciled.summary(), "name, description updated!");
    }

    #[rstest]
    fn test_category_empty_patch_is_rejected(existing_category: Category) {
        assert_eq!(
            reconcile_category(&existing_category, &CategoryPatch::default()),
            Err(ReconcileError::NoFieldsProvided)
        );
    }

    #[rstest]
    fn test_error_messages() {
        assert_eq!(
            ReconcileError::InvalidPriority(9).to_string(),
            "Priority must be between 1-5"
        );
        assert_eq!(
            ReconcileError::NoFieldsProvided.to_string(),
            "No fields provided for update"
        );
    }
}

//! Change tracking for partial updates.
//!
//! A [`ChangeSet`] records which fields of a record a partial update actually
//! modified. Each resource kind lists its updatable fields in a fixed
//! canonical order, and the human-readable summary is produced by filtering
//! that list by membership in the change set.

use std::collections::HashSet;
use std::hash::Hash;

// =============================================================================
// Field
// =============================================================================

/// An updatable field of a resource kind.
pub trait Field: Copy + Eq + Hash + std::fmt::Debug + 'static {
    /// Every updatable field, in the order summaries list them.
    const CANONICAL: &'static [Self];

    /// The wire name of the field.
    fn name(self) -> &'static str;
}

/// Updatable fields of a todo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TodoField {
    Title,
    Content,
    Priority,
    DueDate,
    IsDone,
    CategoryId,
}

impl Field for TodoField {
    const CANONICAL: &'static [Self] = &[
        Self::Title,
        Self::Content,
        Self::Priority,
        Self::DueDate,
        Self::IsDone,
        Self::CategoryId,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Content => "content",
            Self::Priority => "priority",
            Self::DueDate => "due_date",
            Self::IsDone => "is_done",
            Self::CategoryId => "category_id",
        }
    }
}

/// Updatable fields of a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryField {
    Name,
    Description,
}

impl Field for CategoryField {
    const CANONICAL: &'static [Self] = &[Self::Name, Self::Description];

    fn name(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
        }
    }
}

// =============================================================================
// ChangeSet
// =============================================================================

/// The set of fields a partial update modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet<F: Field> {
    fields: HashSet<F>,
}

impl<F: Field> ChangeSet<F> {
    /// Creates an empty change set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            fields: HashSet::with_capacity(F::CANONICAL.len()),
        }
    }

    /// Records `field` as changed. Marking twice has no further effect.
    pub fn mark(&mut self, field: F) {
        self.fields.insert(field);
    }

    /// Returns `true` if `field` was marked.
    #[must_use]
    pub fn contains(&self, field: F) -> bool {
        self.fields.contains(&field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Iterates over the changed fields in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = F> + '_ {
        F::CANONICAL
            .iter()
            .copied()
            .filter(move |field| self.contains(*field))
    }

    /// Returns the wire names of the changed fields in canonical order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.iter().map(Field::name).collect()
    }

    /// Renders the change summary, e.g. `"title, priority updated!"`.
    ///
    /// Returns `None` for an empty change set.
    #[must_use]
    pub fn summary(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        Some(format!("{} updated!", self.names().join(", ")))
    }
}

impl<F: Field> Default for ChangeSet<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Field> FromIterator<F> for ChangeSet<F> {
    fn from_iter<I: IntoIterator<Item = F>>(iter: I) -> Self {
        let mut changes = Self::new();
        for field in iter {
            changes.mark(field);
        }
        changes
    }
}

// =============================================================================
// Tests
// =============================================================================

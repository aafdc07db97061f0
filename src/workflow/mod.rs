//! Workflows that combine the pure domain with the repositories.

pub mod patch;

pub use patch::{
    PatchError, PatchOutcome, RecordKind, apply_category, apply_todo, load_category, load_todo,
    patch_category, patch_todo,
};

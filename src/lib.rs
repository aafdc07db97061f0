//! Todo API Library
//!
//! A REST service for todos and categories. Partial updates go through a
//! reconciliation engine that merges the supplied fields into the stored
//! record, rejects invalid values, and reports which fields changed.
//!
//! - [`domain`]: entities and the pure reconciliation engine
//! - [`workflow`]: load, reconcile and persist a patch
//! - [`infrastructure`]: `SQLite` and in-memory repositories
//! - [`api`]: axum handlers, middleware and routing
//! - [`server`]: listener and graceful shutdown

pub mod api;
pub mod domain;
pub mod infrastructure;
pub mod server;
pub mod workflow;

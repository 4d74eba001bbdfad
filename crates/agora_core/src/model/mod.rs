//! Domain records for the community persistence core.
//!
//! # Responsibility
//! - Define the canonical data structures shared by repositories and
//!   services.
//! - Keep pure record-level predicates free of storage concerns.
//!
//! # Invariants
//! - Every record is identified by a store-assigned surrogate id.
//! - JSON field naming follows the web client contract (camelCase).
//!
//! # See also
//! - docs/architecture/data-model.md

pub mod bookmark;
pub mod post;
pub mod profile;

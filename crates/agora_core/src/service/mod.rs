//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the entry points consumed by the
//!   web/API layer.
//! - Translate store constraint failures into domain conditions
//!   ("nickname taken", "already bookmarked").
//!
//! # See also
//! - docs/architecture/data-model.md

pub mod bookmark_service;
pub mod profile_service;

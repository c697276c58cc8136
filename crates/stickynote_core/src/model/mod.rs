//! Domain model for canvas notes.
//!
//! # Responsibility
//! - Define the value types (`Point`, `Extent`, `Rect`) shared by drag and
//!   store layers.
//! - Define the canonical `Note` record and its identity.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId` assigned at creation.
//! - Geometry helpers are pure; no module state lives here.

pub mod geometry;
pub mod note;

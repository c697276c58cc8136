//! Pointer-driven drag handling.
//!
//! # Responsibility
//! - Track the single in-progress move/resize session.
//! - Translate pointer samples into geometry intents for the note store.
//! - Detect move-drags released over the trash zone.
//!
//! # Invariants
//! - At most one drag session exists at a time.
//! - Drag handling never performs I/O; it only computes and forwards geometry.

pub mod controller;
pub mod trash;

//! Core use-case services.
//!
//! # Responsibility
//! - Own the canonical note collection and its remote/local side effects.
//! - Give presentation a single board facade to drive.

pub mod board;
pub mod note_store;

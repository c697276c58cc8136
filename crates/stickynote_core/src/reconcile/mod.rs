//! Reconciliation between remote authoritative notes and local geometry.
//!
//! # Responsibility
//! - Merge remote note sets with the in-memory collection.
//! - Derive the next stacking-order counter from a merged collection.
//!
//! # Invariants
//! - Local geometry (`position`, `size`, `stack_order`) always wins.
//! - Remote content (`text`, `color`) always wins.
//! - Local-only notes survive every merge.

pub mod merge;

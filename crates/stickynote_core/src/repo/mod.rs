//! Local persistence adapters.
//!
//! # Responsibility
//! - Define the durable snapshot contract used as the offline fallback.
//! - Keep SQLite and serialization details out of the note store.
//!
//! # Invariants
//! - Snapshot reads never fail outward: absent or corrupt data reads as empty.
//! - Snapshot writes are best-effort and never fail outward.

pub mod snapshot_repo;

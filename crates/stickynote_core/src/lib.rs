//! Core interaction and reconciliation engine for canvas sticky notes.
//! This crate is the single source of truth for note invariants.

pub mod config;
pub mod db;
pub mod drag;
pub mod logging;
pub mod model;
pub mod reconcile;
pub mod repo;
pub mod service;
pub mod sync;

pub use config::{ConfigError, CoreConfig, RemoteSimulation, Viewport};
pub use drag::controller::{DragAnchor, DragController, DragIntent, DragMode, DragSession};
pub use drag::trash::{FixedTrashZone, TrashZone};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::geometry::{
    compute_move_position, compute_resize_extent, Extent, Point, Rect, DEFAULT_NOTE_EXTENT,
    MIN_NOTE_HEIGHT, MIN_NOTE_WIDTH,
};
pub use model::note::{Note, NoteId};
pub use reconcile::merge::{merge, next_stack_counter, MergeOutcome};
pub use repo::snapshot_repo::{
    MemorySnapshotStore, SnapshotError, SnapshotResult, SnapshotStore, SqliteSnapshotStore,
    DEFAULT_SNAPSHOT_KEY,
};
pub use service::board::Board;
pub use service::note_store::{Hydration, NoteStore, SyncState};
pub use sync::remote::{RemoteError, RemoteNotes, RemoteResult};
pub use sync::simulated::SimulatedRemote;

/// Minimal health-check API for embedding hosts.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

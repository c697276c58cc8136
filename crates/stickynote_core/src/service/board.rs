//! Presentation-facing board facade.
//!
//! # Responsibility
//! - Route pointer events through the drag controller into the note store.
//! - Read the trash zone bounds when a drag ends.
//! - Expose the read models presentation renders (`notes`, `is_dragging_move`,
//!   `sync_state`).
//!
//! # Invariants
//! - A drag can only start on a note that exists in the store.
//! - Pointer handling never waits on remote calls.
//! - `on_pointer_move` never writes the snapshot or calls the remote; the
//!   drag's final geometry is committed once when the drag ends or is
//!   replaced.

use crate::drag::controller::{DragController, DragIntent, DragMode};
use crate::drag::trash::TrashZone;
use crate::model::geometry::Point;
use crate::model::note::Note;
use crate::service::note_store::{Hydration, NoteStore, SyncState};
use crate::sync::remote::RemoteResult;
use log::debug;
use std::sync::Arc;

/// Canvas board: one note store, one drag controller, one trash zone.
pub struct Board {
    store: Arc<NoteStore>,
    drag: DragController,
    /// Set once a pointer sample changed the dragged note.
    drag_dirty: bool,
    trash: Box<dyn TrashZone + Send + Sync>,
}

impl Board {
    pub fn new(store: Arc<NoteStore>, trash: Box<dyn TrashZone + Send + Sync>) -> Self {
        Self {
            store,
            drag: DragController::new(),
            drag_dirty: false,
            trash,
        }
    }

    /// Shared handle to the underlying store.
    pub fn store(&self) -> &Arc<NoteStore> {
        &self.store
    }

    /// Swaps the trash zone, e.g. after a layout change.
    pub fn set_trash_zone(&mut self, trash: Box<dyn TrashZone + Send + Sync>) {
        self.trash = trash;
    }

    /// Starts a move or resize drag on `note_id` at `pointer`.
    ///
    /// Returns `false` (and leaves the controller untouched) when the note is
    /// unknown.
    pub fn start_drag(&mut self, note_id: &str, mode: DragMode, pointer: Point) -> bool {
        let Some(note) = self.store.note(note_id) else {
            debug!("event=drag_start module=board status=skipped reason=unknown_id note_id={note_id}");
            return false;
        };
        self.commit_active_drag();
        self.drag
            .start_drag(note.id, mode, pointer, note.position, note.size);
        true
    }

    /// Applies one pointer sample to the active drag, if any.
    ///
    /// The new geometry is held in memory until the drag ends.
    pub fn on_pointer_move(&mut self, pointer: Point) -> Option<Note> {
        let intent = self.drag.on_pointer_move(pointer)?;
        let preview = match intent {
            DragIntent::Move { note_id, position } => self.store.preview_move(&note_id, position),
            DragIntent::Resize { note_id, size } => self.store.preview_resize(&note_id, size),
            DragIntent::Delete { note_id } => self.store.remove(&note_id),
        };
        self.drag_dirty |= preview.is_some();
        preview
    }

    /// Ends the active drag; deletes the note when dropped on the trash zone,
    /// otherwise commits its final geometry.
    ///
    /// Returns the deleted note, if any.
    pub fn end_drag(&mut self, pointer: Point) -> Option<Note> {
        let session = self.drag.active_session().cloned()?;
        let dirty = std::mem::take(&mut self.drag_dirty);
        match self.drag.end_drag(pointer, &*self.trash) {
            Some(DragIntent::Delete { note_id }) => self.store.remove(&note_id),
            Some(_) => None,
            None => {
                if dirty {
                    self.store.commit_drag(&session.note_id, session.mode());
                }
                None
            }
        }
    }

    pub fn is_dragging_move(&self) -> bool {
        self.drag.is_dragging_move()
    }

    pub fn create(&self, color: impl Into<String>) -> Note {
        self.store.create(color)
    }

    pub fn update_text(&self, note_id: &str, text: impl Into<String>) -> Option<Note> {
        self.store.update_text(note_id, text)
    }

    pub fn remove(&self, note_id: &str) -> Option<Note> {
        self.store.remove(note_id)
    }

    pub fn raise_to_front(&self, note_id: &str) -> Option<Note> {
        self.store.raise_to_front(note_id)
    }

    pub fn delete_all(&self) -> usize {
        self.store.delete_all()
    }

    pub async fn hydrate(&self) -> Hydration {
        self.store.hydrate().await
    }

    pub async fn refresh_from_server(&self) -> RemoteResult<usize> {
        self.store.refresh_from_server().await
    }

    pub fn notes(&self) -> Vec<Note> {
        self.store.notes()
    }

    pub fn sync_state(&self) -> SyncState {
        self.store.sync_state()
    }

    /// Commits a session that is about to be replaced without a pointer-up.
    fn commit_active_drag(&mut self) {
        if !std::mem::take(&mut self.drag_dirty) {
            return;
        }
        if let Some(session) = self.drag.active_session() {
            self.store.commit_drag(&session.note_id, session.mode());
        }
    }
}

//! Canonical note collection and its mutating use-cases.
//!
//! # Responsibility
//! - Own the in-memory note list, the stack counter and the sync status.
//! - Apply every mutation locally first, persist the snapshot, then start the
//!   matching remote call without waiting for it.
//! - Hydrate once at startup and reconcile on explicit refresh.
//!
//! # Invariants
//! - Each operation and each remote completion applies its whole update under
//!   one lock, so no caller observes a half-updated collection.
//! - Remote failures never roll back a local mutation; they are recorded as
//!   `SyncState::last_error`.
//! - The stack counter never decreases and stays above every `stack_order`.
//! - `resize_note` and `raise_to_front` never reach the remote store.
//! - Drag previews touch memory only; `commit_drag` writes them out once.
//! - Remote completions never write the snapshot themselves; they mark it
//!   stale and the next local write or `settle` flushes it.

use crate::config::{CoreConfig, Viewport};
use crate::drag::controller::DragMode;
use crate::model::geometry::{Extent, Point, DEFAULT_NOTE_EXTENT};
use crate::model::note::{Note, NoteId};
use crate::reconcile::merge::{duplicate_ids, merge};
use crate::repo::snapshot_repo::SnapshotStore;
use crate::sync::remote::{RemoteError, RemoteNotes, RemoteResult};
use futures::future::join_all;
use log::{debug, error, info, warn};
use rand::Rng;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Remote in-flight/error status shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncState {
    /// True while any remote call started by the store is still running.
    pub is_loading: bool,
    /// Most recent remote failure, until cleared or a refresh succeeds.
    pub last_error: Option<RemoteError>,
}

/// Which source populated the collection during startup hydration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hydration {
    /// Non-empty remote fetch was merged in.
    Remote { count: usize },
    /// Remote was empty or unreachable; the local snapshot was adopted.
    Snapshot { count: usize },
    /// Neither source had notes; hydration will be retried on the next call.
    Empty,
    /// Hydration already happened earlier in this process.
    AlreadyHydrated,
}

#[derive(Debug)]
struct StoreState {
    notes: Vec<Note>,
    stack_counter: i64,
    last_error: Option<RemoteError>,
    pending_remote: usize,
    hydrated: bool,
    snapshot_stale: bool,
}

impl StoreState {
    fn find_mut(&mut self, id: &str) -> Option<&mut Note> {
        self.notes.iter_mut().find(|note| note.id == id)
    }

    fn next_stack_order(&mut self) -> i64 {
        let order = self.stack_counter;
        self.stack_counter = self.stack_counter.saturating_add(1);
        order
    }

    fn replace_notes(&mut self, notes: Vec<Note>, stack_counter: i64) {
        self.notes = notes;
        self.stack_counter = self.stack_counter.max(stack_counter);
    }

    fn finish_remote(&mut self) {
        self.pending_remote = self.pending_remote.saturating_sub(1);
    }
}

/// State shared between the store and its spawned remote tasks.
struct Shared {
    state: Mutex<StoreState>,
    snapshots: Arc<dyn SnapshotStore>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn persist(&self, state: &mut StoreState) {
        self.snapshots.save(&state.notes);
        state.snapshot_stale = false;
    }
}

/// Note collection store.
pub struct NoteStore {
    shared: Arc<Shared>,
    remote: Arc<dyn RemoteNotes>,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
    viewport: Viewport,
    spawn_padding: f64,
}

impl NoteStore {
    /// Creates an empty, not-yet-hydrated store.
    pub fn new(
        remote: Arc<dyn RemoteNotes>,
        snapshots: Arc<dyn SnapshotStore>,
        config: &CoreConfig,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(StoreState {
                    notes: Vec::new(),
                    stack_counter: 1,
                    last_error: None,
                    pending_remote: 0,
                    hydrated: false,
                    snapshot_stale: false,
                }),
                snapshots,
            }),
            remote,
            in_flight: Mutex::new(Vec::new()),
            viewport: config.viewport,
            spawn_padding: config.spawn_padding,
        }
    }

    /// Current notes in collection order.
    pub fn notes(&self) -> Vec<Note> {
        self.shared.lock().notes.clone()
    }

    /// Looks up one note by id.
    pub fn note(&self, id: &str) -> Option<Note> {
        self.shared
            .lock()
            .notes
            .iter()
            .find(|note| note.id == id)
            .cloned()
    }

    /// Next stack order to be assigned.
    pub fn stack_counter(&self) -> i64 {
        self.shared.lock().stack_counter
    }

    pub fn sync_state(&self) -> SyncState {
        let state = self.shared.lock();
        SyncState {
            is_loading: state.pending_remote > 0,
            last_error: state.last_error.clone(),
        }
    }

    /// Dismisses the displayed remote error.
    pub fn clear_error(&self) {
        self.shared.lock().last_error = None;
    }

    pub fn is_hydrated(&self) -> bool {
        self.shared.lock().hydrated
    }

    /// Populates the collection once per process.
    ///
    /// A non-empty remote fetch wins; otherwise a non-empty local snapshot is
    /// adopted. Notes created before hydration finished are kept.
    pub async fn hydrate(&self) -> Hydration {
        if self.is_hydrated() {
            return Hydration::AlreadyHydrated;
        }

        let saved = self.shared.snapshots.load();
        self.begin_remote();
        let fetched = self.remote.fetch_all().await;

        let mut state = self.shared.lock();
        state.finish_remote();
        if state.hydrated {
            return Hydration::AlreadyHydrated;
        }

        match fetched {
            Ok(remote_notes) if !remote_notes.is_empty() => {
                warn_duplicates("hydrate", &remote_notes);
                let outcome = merge(&state.notes, &remote_notes);
                let count = outcome.notes.len();
                state.replace_notes(outcome.notes, outcome.stack_counter);
                state.hydrated = true;
                self.shared.persist(&mut state);
                info!("event=store_hydrate module=store status=ok source=remote count={count}");
                return Hydration::Remote { count };
            }
            Ok(_) => {
                debug!("event=store_hydrate module=store status=ok source=remote count=0");
            }
            Err(err) => {
                warn!(
                    "event=store_hydrate module=store status=error source=remote status_code={} error={}",
                    err.status, err.message
                );
                state.last_error = Some(err);
            }
        }

        if saved.is_empty() {
            info!("event=store_hydrate module=store status=ok source=none count=0");
            return Hydration::Empty;
        }

        let outcome = merge(&state.notes, &saved);
        let count = outcome.notes.len();
        state.replace_notes(outcome.notes, outcome.stack_counter);
        state.hydrated = true;
        self.shared.persist(&mut state);
        info!("event=store_hydrate module=store status=ok source=snapshot count={count}");
        Hydration::Snapshot { count }
    }

    /// Fetches the remote collection and merges it over local geometry.
    ///
    /// On success the displayed error is cleared. On failure the local
    /// collection is left untouched.
    pub async fn refresh_from_server(&self) -> RemoteResult<usize> {
        self.begin_remote();
        let fetched = self.remote.fetch_all().await;

        let mut state = self.shared.lock();
        state.finish_remote();
        match fetched {
            Ok(remote_notes) => {
                warn_duplicates("refresh", &remote_notes);
                let outcome = merge(&state.notes, &remote_notes);
                let count = outcome.notes.len();
                state.replace_notes(outcome.notes, outcome.stack_counter);
                state.last_error = None;
                self.shared.persist(&mut state);
                info!("event=store_refresh module=store status=ok count={count}");
                Ok(count)
            }
            Err(err) => {
                warn!(
                    "event=store_refresh module=store status=error status_code={} error={}",
                    err.status, err.message
                );
                state.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Uploads the whole local collection, replacing the remote one.
    pub async fn push_all_to_server(&self) -> RemoteResult<usize> {
        let notes = self.notes();
        self.begin_remote();
        let result = self.remote.save_all(&notes).await;

        let mut state = self.shared.lock();
        state.finish_remote();
        match result {
            Ok(saved) => {
                info!(
                    "event=store_push_all module=store status=ok count={}",
                    saved.len()
                );
                Ok(saved.len())
            }
            Err(err) => {
                warn!(
                    "event=store_push_all module=store status=error status_code={} error={}",
                    err.status, err.message
                );
                state.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Creates a note at a random on-canvas position and saves it remotely.
    ///
    /// The note stays even when the remote save fails.
    pub fn create(&self, color: impl Into<String>) -> Note {
        let position = self.spawn_position();
        let note = {
            let mut state = self.shared.lock();
            let order = state.next_stack_order();
            let note = Note::new(position, DEFAULT_NOTE_EXTENT, color, order);
            state.notes.push(note.clone());
            self.shared.persist(&mut state);
            note
        };
        info!(
            "event=note_create module=store status=ok note_id={} stack_order={}",
            note.id, note.stack_order
        );
        self.spawn_save(note.clone());
        note
    }

    /// Replaces the note text and saves the note remotely.
    pub fn update_text(&self, id: &str, text: impl Into<String>) -> Option<Note> {
        let text = text.into();
        let updated = self.mutate_local("note_update_text", id, true, |note| note.text = text)?;
        self.spawn_save(updated.clone());
        Some(updated)
    }

    /// Moves the note and saves the full note remotely.
    pub fn move_note(&self, id: &str, position: Point) -> Option<Note> {
        let updated =
            self.mutate_local("note_move", id, true, |note| note.position = position)?;
        self.spawn_save(updated.clone());
        Some(updated)
    }

    /// Resizes the note locally; the size is floored at the minimum extent.
    pub fn resize_note(&self, id: &str, size: Extent) -> Option<Note> {
        let size = size.clamped();
        self.mutate_local("note_resize", id, true, |note| note.size = size)
    }

    /// Applies one move-drag sample in memory. No snapshot write, no remote
    /// call.
    pub fn preview_move(&self, id: &str, position: Point) -> Option<Note> {
        self.mutate_local("note_preview_move", id, false, |note| {
            note.position = position
        })
    }

    /// Applies one resize-drag sample in memory, floored at the minimum
    /// extent. No snapshot write, no remote call.
    pub fn preview_resize(&self, id: &str, size: Extent) -> Option<Note> {
        let size = size.clamped();
        self.mutate_local("note_preview_resize", id, false, |note| note.size = size)
    }

    /// Writes out the geometry a finished drag left on `id`.
    ///
    /// The snapshot is written once; a move drag also saves the note remotely,
    /// a resize drag stays local.
    pub fn commit_drag(&self, id: &str, mode: DragMode) -> Option<Note> {
        let committed = {
            let mut state = self.shared.lock();
            let Some(note) = state.notes.iter().find(|note| note.id == id).cloned() else {
                warn!("event=note_commit_drag module=store status=skipped reason=unknown_id note_id={id}");
                return None;
            };
            self.shared.persist(&mut state);
            note
        };
        debug!("event=note_commit_drag module=store status=ok note_id={id}");
        if mode == DragMode::Move {
            self.spawn_save(committed.clone());
        }
        Some(committed)
    }

    /// Puts the note on top of every other note. Local only.
    pub fn raise_to_front(&self, id: &str) -> Option<Note> {
        let mut state = self.shared.lock();
        if !state.notes.iter().any(|note| note.id == id) {
            warn!("event=note_raise module=store status=skipped reason=unknown_id note_id={id}");
            return None;
        }
        let order = state.next_stack_order();
        let note = state.find_mut(id)?;
        note.stack_order = order;
        let raised = note.clone();
        self.shared.persist(&mut state);
        debug!("event=note_raise module=store status=ok note_id={id} stack_order={order}");
        Some(raised)
    }

    /// Removes the note locally, then deletes it remotely.
    ///
    /// A failed remote delete is recorded but the note is not restored.
    pub fn remove(&self, id: &str) -> Option<Note> {
        let removed = {
            let mut state = self.shared.lock();
            let index = state.notes.iter().position(|note| note.id == id);
            let Some(index) = index else {
                warn!("event=note_remove module=store status=skipped reason=unknown_id note_id={id}");
                return None;
            };
            let removed = state.notes.remove(index);
            self.shared.persist(&mut state);
            removed
        };
        info!("event=note_remove module=store status=ok note_id={id}");
        self.spawn_delete(removed.id.clone());
        Some(removed)
    }

    /// Clears the collection, then deletes every previously known note
    /// remotely, concurrently.
    ///
    /// Returns how many notes were cleared. Individual remote failures are
    /// logged and recorded; the local clear is never reversed.
    pub fn delete_all(&self) -> usize {
        let cleared = {
            let mut state = self.shared.lock();
            let cleared = std::mem::take(&mut state.notes);
            self.shared.persist(&mut state);
            cleared
        };
        info!(
            "event=note_delete_all module=store status=ok count={}",
            cleared.len()
        );
        for note in &cleared {
            self.spawn_delete(note.id.clone());
        }
        cleared.len()
    }

    /// Waits until every remote call started so far has completed, then
    /// flushes a stale snapshot.
    pub async fn settle(&self) {
        loop {
            let handles = std::mem::take(&mut *self.lock_in_flight());
            if handles.is_empty() {
                let mut state = self.shared.lock();
                if state.snapshot_stale {
                    self.shared.persist(&mut state);
                }
                return;
            }
            for joined in join_all(handles).await {
                if let Err(err) = joined {
                    error!("event=remote_task module=store status=error error={err}");
                }
            }
        }
    }

    fn mutate_local(
        &self,
        event: &'static str,
        id: &str,
        durable: bool,
        apply: impl FnOnce(&mut Note),
    ) -> Option<Note> {
        let mut state = self.shared.lock();
        let Some(note) = state.find_mut(id) else {
            warn!("event={event} module=store status=skipped reason=unknown_id note_id={id}");
            return None;
        };
        apply(note);
        let updated = note.clone();
        if durable {
            self.shared.persist(&mut state);
        } else {
            state.snapshot_stale = true;
        }
        debug!("event={event} module=store status=ok note_id={id}");
        Some(updated)
    }

    fn spawn_position(&self) -> Point {
        let padding = self.spawn_padding.max(0.0);
        let span_x = (self.viewport.width - DEFAULT_NOTE_EXTENT.width - 2.0 * padding).max(0.0);
        let span_y = (self.viewport.height - DEFAULT_NOTE_EXTENT.height - 2.0 * padding).max(0.0);
        let mut rng = rand::thread_rng();
        Point::new(
            padding + rng.gen::<f64>() * span_x,
            padding + rng.gen::<f64>() * span_y,
        )
    }

    fn spawn_save(&self, note: Note) {
        let remote = Arc::clone(&self.remote);
        let sent = note.clone();
        self.spawn_remote(
            "save",
            note.id.clone(),
            async move { remote.save(&note).await },
            move |state, saved| fold_saved_content(state, &sent, &saved),
        );
    }

    fn spawn_delete(&self, id: NoteId) {
        let remote = Arc::clone(&self.remote);
        let target = id.clone();
        self.spawn_remote(
            "delete",
            id,
            async move { remote.delete(&target).await },
            |_, ()| false,
        );
    }

    /// Runs `call` on the runtime and applies its outcome under the lock.
    ///
    /// `on_ok` returns whether it changed the collection, in which case the
    /// snapshot is marked stale. The task itself never touches storage.
    fn spawn_remote<T, Fut, Apply>(
        &self,
        operation: &'static str,
        note_id: NoteId,
        call: Fut,
        on_ok: Apply,
    ) where
        T: Send + 'static,
        Fut: Future<Output = RemoteResult<T>> + Send + 'static,
        Apply: FnOnce(&mut StoreState, T) -> bool + Send + 'static,
    {
        let Ok(runtime) = Handle::try_current() else {
            error!(
                "event=remote_{operation} module=store status=error error_code=no_runtime note_id={note_id}"
            );
            self.shared.lock().last_error = Some(RemoteError::new(
                503,
                format!("remote {operation} skipped: no async runtime"),
            ));
            return;
        };

        self.begin_remote();
        let shared = Arc::clone(&self.shared);
        let handle = runtime.spawn(async move {
            let result = call.await;
            let mut state = shared.lock();
            state.finish_remote();
            match result {
                Ok(value) => {
                    if on_ok(&mut state, value) {
                        state.snapshot_stale = true;
                    }
                    debug!("event=remote_{operation} module=store status=ok note_id={note_id}");
                }
                Err(err) => {
                    warn!(
                        "event=remote_{operation} module=store status=error note_id={note_id} status_code={} error={}",
                        err.status, err.message
                    );
                    state.last_error = Some(err);
                }
            }
        });

        let mut in_flight = self.lock_in_flight();
        in_flight.retain(|task| !task.is_finished());
        in_flight.push(handle);
    }

    fn begin_remote(&self) {
        self.shared.lock().pending_remote += 1;
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Folds a save response's content into the local note.
///
/// Skipped when the note was removed meanwhile, or when its content changed
/// after the save was sent (a newer save is in flight).
fn fold_saved_content(state: &mut StoreState, sent: &Note, saved: &Note) -> bool {
    let Some(local) = state.find_mut(&saved.id) else {
        return false;
    };
    if local.text != sent.text || local.color != sent.color {
        return false;
    }
    let merged = local.with_remote_content(saved);
    if *local == merged {
        return false;
    }
    *local = merged;
    true
}

fn warn_duplicates(source: &'static str, notes: &[Note]) {
    let duplicates = duplicate_ids(notes);
    if !duplicates.is_empty() {
        warn!(
            "event=remote_duplicate_ids module=store status=error source={source} count={}",
            duplicates.len()
        );
    }
}

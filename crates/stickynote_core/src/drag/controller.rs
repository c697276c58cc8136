//! Drag state machine.
//!
//! # Responsibility
//! - Own the `Idle` / `Dragging` state and the active `DragSession`.
//! - Drive the geometry functions with the session reference data.
//! - Emit `DragIntent`s for the collaborator that owns note mutation.
//!
//! # Invariants
//! - Starting a drag while another is active replaces the old session.
//! - Calls without an active session are no-ops, never errors.
//! - Only move-mode drags can produce a delete intent.

use crate::drag::trash::TrashZone;
use crate::model::geometry::{compute_move_position, compute_resize_extent, Extent, Point};
use crate::model::note::NoteId;
use log::{debug, info};

/// How the pointer manipulates the target note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    /// Pointer moves the note's top-left corner.
    Move,
    /// Pointer stretches the note's bottom-right corner.
    Resize,
}

impl DragMode {
    fn as_str(self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::Resize => "resize",
        }
    }
}

/// Reference data captured at drag start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragAnchor {
    /// Pointer-to-note offset for move drags.
    Move { offset: Point },
    /// Pointer origin plus the note extent when the resize began.
    Resize { origin: Point, extent: Extent },
}

/// Transient record of an in-progress drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub note_id: NoteId,
    pub anchor: DragAnchor,
}

impl DragSession {
    pub fn mode(&self) -> DragMode {
        match self.anchor {
            DragAnchor::Move { .. } => DragMode::Move,
            DragAnchor::Resize { .. } => DragMode::Resize,
        }
    }
}

/// Mutation requested by the drag state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum DragIntent {
    Move { note_id: NoteId, position: Point },
    Resize { note_id: NoteId, size: Extent },
    Delete { note_id: NoteId },
}

/// Single-flight drag state machine.
#[derive(Debug, Default)]
pub struct DragController {
    session: Option<DragSession>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begins a drag on `note_id`, replacing any active session.
    ///
    /// A new pointer-down while dragging means the previous pointer-up was
    /// missed, so the old session is dropped without emitting anything.
    pub fn start_drag(
        &mut self,
        note_id: impl Into<NoteId>,
        mode: DragMode,
        pointer: Point,
        note_position: Point,
        note_extent: Extent,
    ) {
        let note_id = note_id.into();
        if let Some(previous) = self.session.take() {
            debug!(
                "event=drag_replaced module=drag status=ok previous_note_id={} note_id={}",
                previous.note_id, note_id
            );
        }

        let anchor = match mode {
            DragMode::Move => DragAnchor::Move {
                offset: pointer - note_position,
            },
            DragMode::Resize => DragAnchor::Resize {
                origin: pointer,
                extent: note_extent,
            },
        };
        debug!(
            "event=drag_start module=drag status=ok mode={} note_id={}",
            mode.as_str(),
            note_id
        );
        self.session = Some(DragSession { note_id, anchor });
    }

    /// Computes the geometry for one pointer sample.
    ///
    /// Safe to call for every pointer-move event.
    pub fn on_pointer_move(&self, pointer: Point) -> Option<DragIntent> {
        let session = self.session.as_ref()?;
        let intent = match session.anchor {
            DragAnchor::Move { offset } => DragIntent::Move {
                note_id: session.note_id.clone(),
                position: compute_move_position(pointer, offset),
            },
            DragAnchor::Resize { origin, extent } => DragIntent::Resize {
                note_id: session.note_id.clone(),
                size: compute_resize_extent(pointer, origin, extent),
            },
        };
        Some(intent)
    }

    /// Finishes the active drag and returns to idle.
    ///
    /// Returns a delete intent when a move drag is released inside the trash
    /// zone bounds (inclusive edges).
    pub fn end_drag(&mut self, pointer: Point, trash: &dyn TrashZone) -> Option<DragIntent> {
        let session = self.session.take()?;
        if session.mode() != DragMode::Move {
            debug!(
                "event=drag_end module=drag status=ok mode=resize note_id={}",
                session.note_id
            );
            return None;
        }

        if trash.bounds().contains(pointer) {
            info!(
                "event=drag_drop_trash module=drag status=ok note_id={}",
                session.note_id
            );
            return Some(DragIntent::Delete {
                note_id: session.note_id,
            });
        }

        debug!(
            "event=drag_end module=drag status=ok mode=move note_id={}",
            session.note_id
        );
        None
    }

    /// Returns the active session, if any.
    pub fn active_session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// True only while a move-mode drag is active.
    pub fn is_dragging_move(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.mode() == DragMode::Move)
    }
}

#[cfg(test)]
mod tests {
    use super::{DragController, DragIntent, DragMode};
    use crate::drag::trash::FixedTrashZone;
    use crate::model::geometry::{Extent, Point, Rect};

    fn trash() -> FixedTrashZone {
        FixedTrashZone::new(Rect::new(900.0, 600.0, 1000.0, 700.0))
    }

    #[test]
    fn idle_controller_ignores_pointer_events() {
        let mut controller = DragController::new();
        assert!(controller.on_pointer_move(Point::new(1.0, 1.0)).is_none());
        assert!(controller
            .end_drag(Point::new(950.0, 650.0), &trash())
            .is_none());
        assert!(!controller.is_dragging_move());
    }

    #[test]
    fn move_drag_keeps_pointer_offset() {
        let mut controller = DragController::new();
        controller.start_drag(
            "a",
            DragMode::Move,
            Point::new(110.0, 120.0),
            Point::new(100.0, 100.0),
            Extent::default(),
        );
        assert!(controller.is_dragging_move());

        let intent = controller.on_pointer_move(Point::new(210.0, 320.0));
        assert_eq!(
            intent,
            Some(DragIntent::Move {
                note_id: "a".to_string(),
                position: Point::new(200.0, 300.0),
            })
        );
    }

    #[test]
    fn resize_drag_is_not_reported_as_move() {
        let mut controller = DragController::new();
        controller.start_drag(
            "a",
            DragMode::Resize,
            Point::new(0.0, 0.0),
            Point::new(50.0, 50.0),
            Extent::new(200.0, 150.0),
        );
        assert!(!controller.is_dragging_move());
        assert!(controller.active_session().is_some());
    }

    #[test]
    fn starting_new_drag_replaces_session() {
        let mut controller = DragController::new();
        controller.start_drag(
            "a",
            DragMode::Move,
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
            Extent::default(),
        );
        controller.start_drag(
            "b",
            DragMode::Resize,
            Point::new(5.0, 5.0),
            Point::new(0.0, 0.0),
            Extent::new(300.0, 200.0),
        );

        let session = controller.active_session().expect("session should exist");
        assert_eq!(session.note_id, "b");
        assert_eq!(session.mode(), DragMode::Resize);
    }

    #[test]
    fn end_drag_always_returns_to_idle() {
        let mut controller = DragController::new();
        controller.start_drag(
            "a",
            DragMode::Move,
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
            Extent::default(),
        );
        let intent = controller.end_drag(Point::new(950.0, 650.0), &trash());
        assert_eq!(
            intent,
            Some(DragIntent::Delete {
                note_id: "a".to_string()
            })
        );
        assert!(controller.active_session().is_none());
        assert!(controller.on_pointer_move(Point::new(3.0, 3.0)).is_none());
    }
}

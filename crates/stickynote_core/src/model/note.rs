//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical canvas note record.
//! - Split fields into locally-owned geometry and remote-owned content.
//!
//! # Invariants
//! - `id` is stable and never reused for another note.
//! - `size` respects the minimum note extent once it passed through a resize.

use crate::model::geometry::{Extent, Point};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a note, a UUID rendered as text.
///
/// Kept as a type alias so remote/imported ids of any shape are accepted.
pub type NoteId = String;

/// Canvas note record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Stable global ID used for remote sync and snapshot mapping.
    pub id: NoteId,
    /// Top-left corner in canvas coordinates. Locally owned.
    pub position: Point,
    /// Card extent. Locally owned.
    pub size: Extent,
    /// Free-form body text. Remote owned.
    pub text: String,
    /// Presentation color token such as `#fff59d`. Remote owned.
    pub color: String,
    /// Layering order; higher values draw on top. Locally owned.
    pub stack_order: i64,
}

impl Note {
    /// Creates an empty note with a freshly generated id.
    pub fn new(position: Point, size: Extent, color: impl Into<String>, stack_order: i64) -> Self {
        Self::with_id(
            Uuid::new_v4().to_string(),
            position,
            size,
            color,
            stack_order,
        )
    }

    /// Creates an empty note with a caller-provided id.
    ///
    /// Used by import/sync paths where identity already exists externally.
    pub fn with_id(
        id: impl Into<NoteId>,
        position: Point,
        size: Extent,
        color: impl Into<String>,
        stack_order: i64,
    ) -> Self {
        Self {
            id: id.into(),
            position,
            size,
            text: String::new(),
            color: color.into(),
            stack_order,
        }
    }

    /// Returns a copy of `remote` carrying this note's geometry and order.
    ///
    /// Content fields (`text`, `color`) come from `remote`.
    pub fn with_remote_content(&self, remote: &Note) -> Note {
        Note {
            id: remote.id.clone(),
            position: self.position,
            size: self.size,
            text: remote.text.clone(),
            color: remote.color.clone(),
            stack_order: self.stack_order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Note;
    use crate::model::geometry::{Extent, Point};

    #[test]
    fn new_generates_distinct_ids() {
        let first = Note::new(Point::default(), Extent::default(), "#fff", 1);
        let second = Note::new(Point::default(), Extent::default(), "#fff", 2);
        assert_ne!(first.id, second.id);
        assert!(first.text.is_empty());
    }

    #[test]
    fn with_remote_content_keeps_local_geometry() {
        let local = Note::with_id(
            "a",
            Point::new(10.0, 10.0),
            Extent::new(200.0, 150.0),
            "#000",
            5,
        );
        let mut remote = Note::with_id("a", Point::new(0.0, 0.0), Extent::new(50.0, 50.0), "#fff", 1);
        remote.text = "hi".to_string();

        let merged = local.with_remote_content(&remote);
        assert_eq!(merged.position, Point::new(10.0, 10.0));
        assert_eq!(merged.size, Extent::new(200.0, 150.0));
        assert_eq!(merged.stack_order, 5);
        assert_eq!(merged.text, "hi");
        assert_eq!(merged.color, "#fff");
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let note = Note::with_id("n1", Point::new(1.0, 2.0), Extent::default(), "#fff", 3);
        let json = serde_json::to_value(&note).expect("note should serialize");
        assert_eq!(json["stackOrder"], 3);
        assert_eq!(json["position"]["x"], 1.0);
    }
}

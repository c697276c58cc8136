//! Pure two-source note merge.

use crate::model::note::{Note, NoteId};
use std::collections::{HashMap, HashSet};

/// Result of merging local and remote note sets.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// Remote notes (in remote order) followed by local-only notes.
    pub notes: Vec<Note>,
    /// `1 + max(stack_order)` over `notes`, or `1` when empty.
    pub stack_counter: i64,
}

/// Merges `remote` into `local`.
///
/// Rules:
/// - Shared ids keep remote `text`/`color` and local `position`/`size`/
///   `stack_order`.
/// - Remote-only notes pass through unchanged.
/// - Local-only notes are appended unchanged, in local order.
/// - Repeated ids in either input collapse to their first occurrence, so the
///   outcome never holds two notes with the same id.
///
/// The function is pure and idempotent: merging the outcome against the same
/// remote set yields the same outcome.
pub fn merge(local: &[Note], remote: &[Note]) -> MergeOutcome {
    let mut local_by_id: HashMap<&str, &Note> = HashMap::with_capacity(local.len());
    for note in local {
        local_by_id.entry(note.id.as_str()).or_insert(note);
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(remote.len() + local.len());
    let mut notes = Vec::with_capacity(remote.len() + local.len());
    for remote_note in remote {
        if !seen.insert(remote_note.id.as_str()) {
            continue;
        }
        match local_by_id.get(remote_note.id.as_str()) {
            Some(local_note) => notes.push(local_note.with_remote_content(remote_note)),
            None => notes.push(remote_note.clone()),
        }
    }
    for local_note in local {
        if seen.insert(local_note.id.as_str()) {
            notes.push(local_note.clone());
        }
    }

    let stack_counter = next_stack_counter(&notes);
    MergeOutcome {
        notes,
        stack_counter,
    }
}

/// Returns `1 + max(stack_order)` over `notes`, or `1` for an empty slice.
pub fn next_stack_counter(notes: &[Note]) -> i64 {
    notes
        .iter()
        .map(|note| note.stack_order)
        .max()
        .map_or(1, |max| max.saturating_add(1))
}

/// Returns ids that occur more than once, in first-duplicate order.
///
/// Remote stores are expected to return unique ids; callers log any
/// duplicates before `merge` collapses them.
pub fn duplicate_ids(notes: &[Note]) -> Vec<NoteId> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for note in notes {
        if !seen.insert(note.id.as_str()) && !duplicates.contains(&note.id) {
            duplicates.push(note.id.clone());
        }
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::{duplicate_ids, merge, next_stack_counter};
    use crate::model::geometry::{Extent, Point};
    use crate::model::note::Note;

    fn note(id: &str, order: i64) -> Note {
        Note::with_id(id, Point::new(0.0, 0.0), Extent::default(), "#fff", order)
    }

    #[test]
    fn empty_merge_starts_counter_at_one() {
        let outcome = merge(&[], &[]);
        assert!(outcome.notes.is_empty());
        assert_eq!(outcome.stack_counter, 1);
    }

    #[test]
    fn remote_only_notes_pass_through() {
        let remote = vec![note("r1", 3), note("r2", 7)];
        let outcome = merge(&[], &remote);
        assert_eq!(outcome.notes, remote);
        assert_eq!(outcome.stack_counter, 8);
    }

    #[test]
    fn counter_handles_negative_orders() {
        assert_eq!(next_stack_counter(&[note("a", -4)]), -3);
    }

    #[test]
    fn repeated_local_ids_collapse_to_first() {
        let mut shadow = note("a", 9);
        shadow.text = "shadow".to_string();
        let outcome = merge(&[note("a", 1), shadow], &[]);
        assert_eq!(outcome.notes, vec![note("a", 1)]);
        assert_eq!(outcome.stack_counter, 2);
    }

    #[test]
    fn duplicate_ids_reports_each_repeat_once() {
        let notes = vec![note("a", 1), note("b", 1), note("a", 2), note("a", 3)];
        assert_eq!(duplicate_ids(&notes), vec!["a".to_string()]);
    }
}

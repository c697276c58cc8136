//! In-process authoritative note store with injected latency and failures.
//!
//! # Invariants
//! - Stored notes keep insertion order; upserts replace in place.
//! - A simulated failure leaves the stored collection untouched.

use crate::config::RemoteSimulation;
use crate::model::note::{Note, NoteId};
use crate::sync::remote::{RemoteError, RemoteNotes, RemoteResult};
use async_trait::async_trait;
use log::debug;
use rand::Rng;
use std::sync::{Mutex, MutexGuard};

/// Simulated remote note store.
#[derive(Debug, Default)]
pub struct SimulatedRemote {
    notes: Mutex<Vec<Note>>,
    simulation: Mutex<RemoteSimulation>,
}

impl SimulatedRemote {
    pub fn new(simulation: RemoteSimulation) -> Self {
        Self {
            notes: Mutex::new(Vec::new()),
            simulation: Mutex::new(simulation),
        }
    }

    /// Creates a remote already holding `notes`.
    pub fn with_notes(simulation: RemoteSimulation, notes: Vec<Note>) -> Self {
        Self {
            notes: Mutex::new(notes),
            simulation: Mutex::new(simulation),
        }
    }

    /// Changes latency/failure injection for subsequent calls.
    pub fn set_simulation(&self, simulation: RemoteSimulation) {
        *self
            .simulation
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = simulation;
    }

    /// Current stored collection, bypassing latency and failures.
    pub fn snapshot(&self) -> Vec<Note> {
        self.lock_notes().clone()
    }

    fn lock_notes(&self) -> MutexGuard<'_, Vec<Note>> {
        self.notes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn simulate(&self, operation: &'static str) -> RemoteResult<()> {
        let simulation = *self
            .simulation
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if simulation.latency_ms > 0 {
            tokio::time::sleep(simulation.latency()).await;
        }

        if roll_failure(simulation.failure_rate()) {
            debug!("event=remote_simulated_failure module=sync status=error operation={operation}");
            return Err(RemoteError::server(format!(
                "simulated server error during {operation}"
            )));
        }
        Ok(())
    }
}

fn roll_failure(failure_rate: f64) -> bool {
    failure_rate > 0.0 && rand::thread_rng().gen_bool(failure_rate)
}

#[async_trait]
impl RemoteNotes for SimulatedRemote {
    async fn fetch_all(&self) -> RemoteResult<Vec<Note>> {
        self.simulate("fetch_all").await?;
        Ok(self.snapshot())
    }

    async fn save(&self, note: &Note) -> RemoteResult<Note> {
        self.simulate("save").await?;
        let mut notes = self.lock_notes();
        match notes.iter_mut().find(|stored| stored.id == note.id) {
            Some(stored) => *stored = note.clone(),
            None => notes.push(note.clone()),
        }
        Ok(note.clone())
    }

    async fn save_all(&self, notes: &[Note]) -> RemoteResult<Vec<Note>> {
        self.simulate("save_all").await?;
        *self.lock_notes() = notes.to_vec();
        Ok(notes.to_vec())
    }

    async fn delete(&self, id: &str) -> RemoteResult<()> {
        self.simulate("delete").await?;
        let mut notes = self.lock_notes();
        let before = notes.len();
        notes.retain(|stored| stored.id != id);
        if notes.len() == before {
            return Err(RemoteError::not_found(id));
        }
        Ok(())
    }

    async fn delete_many(&self, ids: &[NoteId]) -> RemoteResult<()> {
        self.simulate("delete_many").await?;
        let mut notes = self.lock_notes();
        let missing: Vec<&str> = ids
            .iter()
            .filter(|id| !notes.iter().any(|stored| &stored.id == *id))
            .map(String::as_str)
            .collect();
        notes.retain(|stored| !ids.contains(&stored.id));
        if !missing.is_empty() {
            return Err(RemoteError::new(
                404,
                format!("notes not found: {}", missing.join(",")),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SimulatedRemote;
    use crate::config::RemoteSimulation;
    use crate::model::geometry::{Extent, Point};
    use crate::model::note::Note;
    use crate::sync::remote::RemoteNotes;

    fn note(id: &str) -> Note {
        Note::with_id(id, Point::default(), Extent::default(), "#fff", 1)
    }

    #[tokio::test]
    async fn save_upserts_by_id() {
        let remote = SimulatedRemote::default();
        let mut first = note("a");
        remote.save(&first).await.expect("insert should succeed");
        first.text = "edited".to_string();
        remote.save(&first).await.expect("update should succeed");

        let stored = remote.fetch_all().await.expect("fetch should succeed");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].text, "edited");
    }

    #[tokio::test]
    async fn delete_unknown_id_returns_404() {
        let remote = SimulatedRemote::default();
        let err = remote.delete("ghost").await.expect_err("unknown id should fail");
        assert_eq!(err.status, 404);
    }

    #[tokio::test]
    async fn delete_many_removes_known_and_reports_missing() {
        let remote =
            SimulatedRemote::with_notes(RemoteSimulation::default(), vec![note("a"), note("b")]);
        let err = remote
            .delete_many(&["a".to_string(), "zz".to_string()])
            .await
            .expect_err("missing id should be reported");
        assert_eq!(err.status, 404);
        assert!(err.message.contains("zz"));
        assert_eq!(remote.snapshot(), vec![note("b")]);
    }

    #[tokio::test]
    async fn full_failure_rate_fails_without_mutation() {
        let remote = SimulatedRemote::new(RemoteSimulation::new(0, 1.0));
        let err = remote.save(&note("a")).await.expect_err("save should fail");
        assert_eq!(err.status, 500);
        assert!(remote.snapshot().is_empty());
    }

    #[tokio::test]
    async fn save_all_replaces_collection() {
        let remote = SimulatedRemote::with_notes(RemoteSimulation::default(), vec![note("old")]);
        remote
            .save_all(&[note("new")])
            .await
            .expect("save_all should succeed");
        assert_eq!(remote.snapshot(), vec![note("new")]);
    }
}

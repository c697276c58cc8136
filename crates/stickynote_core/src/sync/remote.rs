//! Remote note store contract.

use crate::model::note::{Note, NoteId};
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Failed remote operation, network or server side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    /// HTTP-like status code (`404` unknown id, `500` server failure).
    pub status: u16,
    /// Human-readable failure message, shown to the user as-is.
    pub message: String,
}

impl RemoteError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(id: &str) -> Self {
        Self::new(404, format!("note not found: {id}"))
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(500, message)
    }
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "remote error {}: {}", self.status, self.message)
    }
}

impl Error for RemoteError {}

/// Asynchronous CRUD boundary to the authoritative note store.
#[async_trait]
pub trait RemoteNotes: Send + Sync {
    /// Returns every note the remote knows.
    async fn fetch_all(&self) -> RemoteResult<Vec<Note>>;
    /// Upserts one note by id and returns the stored version.
    async fn save(&self, note: &Note) -> RemoteResult<Note>;
    /// Replaces the whole remote collection.
    async fn save_all(&self, notes: &[Note]) -> RemoteResult<Vec<Note>>;
    /// Deletes one note; `404` when the id is unknown.
    async fn delete(&self, id: &str) -> RemoteResult<()>;
    /// Deletes several notes in one call.
    async fn delete_many(&self, ids: &[NoteId]) -> RemoteResult<()>;
}

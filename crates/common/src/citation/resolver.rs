//! Note reference resolution
//!
//! Maps a marker token to the note it refers to. Tokens are public
//! identifiers first; internal UUIDs are accepted as a fallback for content
//! written before public identifiers existed. Unresolved tokens are not an
//! error, callers handle absence.

use super::scan::strip_marker_prefix;
use crate::db::models::Note;
use crate::db::Repository;
use crate::errors::Result;
use uuid::Uuid;

/// Read-only resolver over the note lookup surface
#[derive(Clone)]
pub struct NoteResolver {
    repo: Repository,
}

impl NoteResolver {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Resolve a marker token to a note, or `None` if it matches nothing.
    pub async fn resolve(&self, token: &str) -> Result<Option<Note>> {
        let token = strip_marker_prefix(token);

        if let Some(note) = self.repo.find_note_by_public_id(token).await? {
            return Ok(Some(note));
        }

        // Fallback: treat the token as an internal identifier
        if let Ok(id) = Uuid::parse_str(token) {
            return self.repo.find_note_by_id(id).await;
        }

        Ok(None)
    }
}

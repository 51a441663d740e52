//! Citation graph service
//!
//! CRUD and query operations over the citation store. Mutations are
//! restricted to the owner of the citing note; reads are unrestricted here,
//! note visibility is the note service's concern.

use crate::db::models::{Citation, Note};
use crate::db::{CitationMetadata, Repository};
use crate::errors::{AppError, Result};
use crate::metrics;
use serde::Serialize;
use uuid::Uuid;

/// Per-note citation counts
#[derive(Debug, Clone, Serialize)]
pub struct CitationStats {
    pub note_id: Uuid,
    pub outgoing_count: u64,
    pub incoming_count: u64,
}

/// A cited note joined with its relationship metadata
#[derive(Debug, Clone, Serialize)]
pub struct CitedNoteSummary {
    pub citation_id: Uuid,
    pub note_id: Uuid,
    pub public_id: String,
    pub title: String,
    pub authors: Option<String>,
    pub publication_year: Option<i32>,
    pub citation_order: i32,
    pub page_reference: Option<String>,
}

/// A citing note joined with its relationship metadata
#[derive(Debug, Clone, Serialize)]
pub struct CitingNoteSummary {
    pub citation_id: Uuid,
    pub note_id: Uuid,
    pub public_id: String,
    pub title: String,
    pub context: Option<String>,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

/// Service for managing note-to-note citations in the knowledge graph
#[derive(Clone)]
pub struct CitationService {
    repo: Repository,
}

impl CitationService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Load a note and verify the caller owns it
    async fn owned_note(&self, caller_id: Uuid, note_id: Uuid) -> Result<Note> {
        let note = self
            .repo
            .find_note_by_id(note_id)
            .await?
            .ok_or_else(|| AppError::NoteNotFound {
                id: note_id.to_string(),
            })?;

        if note.owner_id != caller_id {
            return Err(AppError::Forbidden {
                message: "Only the owner of the citing note may modify its citations".to_string(),
            });
        }

        Ok(note)
    }

    // ========================================================================
    // Citation CRUD
    // ========================================================================

    /// Create a citation from one note to another
    pub async fn create_citation(
        &self,
        caller_id: Uuid,
        citing_note_id: Uuid,
        cited_note_id: Uuid,
        metadata: CitationMetadata,
    ) -> Result<Citation> {
        if citing_note_id == cited_note_id {
            return Err(AppError::SelfCitation);
        }

        self.owned_note(caller_id, citing_note_id).await?;

        self.repo
            .find_note_by_id(cited_note_id)
            .await?
            .ok_or_else(|| AppError::NoteNotFound {
                id: cited_note_id.to_string(),
            })?;

        if self
            .repo
            .find_citation_by_pair(citing_note_id, cited_note_id)
            .await?
            .is_some()
        {
            return Err(AppError::DuplicateCitation {
                citing_id: citing_note_id.to_string(),
                cited_id: cited_note_id.to_string(),
            });
        }

        // Best-effort sequence; a concurrent create may produce a duplicate
        // order value, which list/render tolerate.
        let next_order = self.repo.max_citation_order(citing_note_id).await? + 1;

        let citation = self
            .repo
            .create_citation(citing_note_id, cited_note_id, next_order, metadata)
            .await?;

        metrics::record_citation_mutation("create");
        tracing::info!(
            citation_id = %citation.id,
            citing_note_id = %citing_note_id,
            cited_note_id = %cited_note_id,
            citation_order = next_order,
            "Citation created"
        );

        Ok(citation)
    }

    /// Update citation metadata; only the provided fields are applied
    pub async fn update_citation(
        &self,
        caller_id: Uuid,
        citation_id: Uuid,
        metadata: CitationMetadata,
    ) -> Result<Citation> {
        let citation = self
            .repo
            .find_citation_by_id(citation_id)
            .await?
            .ok_or_else(|| AppError::CitationNotFound {
                id: citation_id.to_string(),
            })?;

        self.owned_note(caller_id, citation.citing_note_id).await?;

        self.repo.update_citation(citation, metadata).await
    }

    /// Delete a citation by ID
    pub async fn delete_citation(&self, caller_id: Uuid, citation_id: Uuid) -> Result<()> {
        let citation = self
            .repo
            .find_citation_by_id(citation_id)
            .await?
            .ok_or_else(|| AppError::CitationNotFound {
                id: citation_id.to_string(),
            })?;

        self.owned_note(caller_id, citation.citing_note_id).await?;

        self.repo.delete_citation(citation.id).await?;
        metrics::record_citation_mutation("delete");
        tracing::info!(citation_id = %citation_id, "Citation deleted");
        Ok(())
    }

    /// Delete a citation by its (citing, cited) pair
    pub async fn delete_citation_by_pair(
        &self,
        caller_id: Uuid,
        citing_note_id: Uuid,
        cited_note_id: Uuid,
    ) -> Result<()> {
        let citation = self
            .repo
            .find_citation_by_pair(citing_note_id, cited_note_id)
            .await?
            .ok_or_else(|| AppError::CitationNotFound {
                id: format!("{} -> {}", citing_note_id, cited_note_id),
            })?;

        self.owned_note(caller_id, citation.citing_note_id).await?;

        self.repo.delete_citation(citation.id).await?;
        metrics::record_citation_mutation("delete");
        tracing::info!(citation_id = %citation.id, "Citation deleted");
        Ok(())
    }

    // ========================================================================
    // Query Operations
    // ========================================================================

    /// All outgoing citations from a note, by citation order
    pub async fn list_outgoing(&self, note_id: Uuid) -> Result<Vec<Citation>> {
        self.repo.list_outgoing(note_id).await
    }

    /// All incoming citations to a note, newest first
    pub async fn list_incoming(&self, note_id: Uuid) -> Result<Vec<Citation>> {
        self.repo.list_incoming(note_id).await
    }

    /// Cited notes (notes referenced by this note) with summary info.
    /// Relationships whose cited note no longer resolves are skipped.
    pub async fn cited_notes(&self, note_id: Uuid) -> Result<Vec<CitedNoteSummary>> {
        let citations = self.repo.list_outgoing(note_id).await?;

        let mut summaries = Vec::with_capacity(citations.len());
        for citation in citations {
            if let Some(note) = self.repo.find_note_by_id(citation.cited_note_id).await? {
                summaries.push(CitedNoteSummary {
                    citation_id: citation.id,
                    note_id: note.id,
                    public_id: note.public_id,
                    title: note.title,
                    authors: note.authors,
                    publication_year: note.publication_year,
                    citation_order: citation.citation_order,
                    page_reference: citation.page_reference,
                });
            }
        }

        Ok(summaries)
    }

    /// Citing notes (notes that reference this note) with summary info
    pub async fn citing_notes(&self, note_id: Uuid) -> Result<Vec<CitingNoteSummary>> {
        let citations = self.repo.list_incoming(note_id).await?;

        let mut summaries = Vec::with_capacity(citations.len());
        for citation in citations {
            if let Some(note) = self.repo.find_note_by_id(citation.citing_note_id).await? {
                summaries.push(CitingNoteSummary {
                    citation_id: citation.id,
                    note_id: note.id,
                    public_id: note.public_id,
                    title: note.title,
                    context: citation.context,
                    created_at: citation.created_at,
                });
            }
        }

        Ok(summaries)
    }

    /// Citation statistics for a note; zero counts if none
    pub async fn stats(&self, note_id: Uuid) -> Result<CitationStats> {
        let outgoing_count = self.repo.count_outgoing(note_id).await?;
        let incoming_count = self.repo.count_incoming(note_id).await?;

        Ok(CitationStats {
            note_id,
            outgoing_count,
            incoming_count,
        })
    }

    // ========================================================================
    // Citation Order Management
    // ========================================================================

    /// Rewrite the citation order for a note from the given sequence.
    /// Applied transactionally; a partial reorder is never observable.
    pub async fn reorder(
        &self,
        caller_id: Uuid,
        note_id: Uuid,
        ordered_citation_ids: Vec<Uuid>,
    ) -> Result<()> {
        self.owned_note(caller_id, note_id).await?;

        self.repo
            .reorder_citations(note_id, ordered_citation_ids)
            .await?;

        metrics::record_citation_mutation("reorder");
        tracing::info!(note_id = %note_id, "Citations reordered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbPool;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn sample_note(owner_id: Uuid) -> Note {
        let now = chrono::Utc::now();
        Note {
            id: Uuid::new_v4(),
            public_id: "pub123".to_string(),
            owner_id,
            title: "Citing note".to_string(),
            content: None,
            authors: None,
            publication_year: None,
            publisher: None,
            citation_key: None,
            url: None,
            note_type: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn sample_citation(citing: Uuid, cited: Uuid, order: i32) -> Citation {
        let now = chrono::Utc::now();
        Citation {
            id: Uuid::new_v4(),
            citing_note_id: citing,
            cited_note_id: cited,
            citation_order: order,
            page_reference: None,
            inline_marker: None,
            context: None,
            first_position: None,
            citation_count: 1,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn service(db: MockDatabase) -> CitationService {
        CitationService::new(Repository::new(DbPool {
            primary: Arc::new(db.into_connection()),
            replica: None,
        }))
    }

    #[tokio::test]
    async fn test_self_citation_rejected_before_any_query() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));
        let note_id = Uuid::new_v4();

        let err = svc
            .create_citation(
                Uuid::new_v4(),
                note_id,
                note_id,
                CitationMetadata::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::SelfCitation));
    }

    #[tokio::test]
    async fn test_duplicate_citation_rejected() {
        let caller = Uuid::new_v4();
        let citing = sample_note(caller);
        let cited = sample_note(Uuid::new_v4());
        let existing = sample_citation(citing.id, cited.id, 1);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![citing.clone()], vec![cited.clone()]])
            .append_query_results([vec![existing]]);

        let err = service(db)
            .create_citation(caller, citing.id, cited.id, CitationMetadata::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::DuplicateCitation { .. }));
    }

    #[tokio::test]
    async fn test_create_requires_ownership() {
        let citing = sample_note(Uuid::new_v4());
        let other_user = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![citing.clone()]]);

        let err = service(db)
            .create_citation(
                other_user,
                citing.id,
                Uuid::new_v4(),
                CitationMetadata::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn test_update_missing_citation_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Citation>::new()]);

        let err = service(db)
            .update_citation(Uuid::new_v4(), Uuid::new_v4(), CitationMetadata::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::CitationNotFound { .. }));
    }

    #[tokio::test]
    async fn test_stats_counts_both_directions() {
        let count_row = |n: i64| BTreeMap::from([("num_items", Value::BigInt(Some(n)))]);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count_row(3)], vec![count_row(1)]]);

        let note_id = Uuid::new_v4();
        let stats = service(db).stats(note_id).await.unwrap();
        assert_eq!(stats.outgoing_count, 3);
        assert_eq!(stats.incoming_count, 1);
        assert_eq!(stats.note_id, note_id);
    }

    #[tokio::test]
    async fn test_reorder_assigns_sequential_orders() {
        let caller = Uuid::new_v4();
        let note = sample_note(caller);
        let ids = vec![Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];

        let exec = |rows| MockExecResult {
            last_insert_id: 0,
            rows_affected: rows,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![note.clone()]])
            .append_exec_results([exec(1), exec(1), exec(1)]);

        let conn = Arc::new(db.into_connection());
        let svc = CitationService::new(Repository::new(DbPool {
            primary: conn.clone(),
            replica: None,
        }));

        svc.reorder(caller, note.id, ids.clone())
            .await
            .expect("reorder should apply every update");

        drop(svc);
        let log = Arc::try_unwrap(conn)
            .expect("service released the connection")
            .into_transaction_log();
        let statements = format!("{:?}", log);

        // Each submitted id gets order = index + 1, in the submitted sequence
        let mut last_position = 0;
        for (index, id) in ids.iter().enumerate() {
            assert!(statements.contains(&format!("Int(Some({}))", index + 1)));
            let position = statements
                .find(&id.to_string())
                .expect("update references the citation id");
            assert!(position > last_position);
            last_position = position;
        }
    }
}

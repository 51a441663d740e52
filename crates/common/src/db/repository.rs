//! Repository pattern for database operations
//!
//! Provides a clean interface for all data access operations
//! with proper error handling and transaction support.

use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionError, TransactionTrait,
};
use uuid::Uuid;

/// Metadata accepted when creating or updating a citation relationship
#[derive(Debug, Clone, Default)]
pub struct CitationMetadata {
    pub page_reference: Option<String>,
    pub inline_marker: Option<String>,
    pub context: Option<String>,
    pub first_position: Option<i32>,
    pub citation_count: Option<i32>,
}

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    // ========================================================================
    // Health Check
    // ========================================================================

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // Note Operations (narrow lookup surface over the external note store)
    // ========================================================================

    /// Find note by internal ID
    pub async fn find_note_by_id(&self, id: Uuid) -> Result<Option<Note>> {
        NoteEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find note by its stable public identifier
    pub async fn find_note_by_public_id(&self, public_id: &str) -> Result<Option<Note>> {
        NoteEntity::find()
            .filter(NoteColumn::PublicId.eq(public_id))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Citation Operations
    // ========================================================================

    /// Create a new citation relationship
    pub async fn create_citation(
        &self,
        citing_note_id: Uuid,
        cited_note_id: Uuid,
        citation_order: i32,
        metadata: CitationMetadata,
    ) -> Result<Citation> {
        let now = chrono::Utc::now();

        let citation = CitationActiveModel {
            id: Set(Uuid::new_v4()),
            citing_note_id: Set(citing_note_id),
            cited_note_id: Set(cited_note_id),
            citation_order: Set(citation_order),
            page_reference: Set(metadata.page_reference),
            inline_marker: Set(metadata.inline_marker),
            context: Set(metadata.context),
            first_position: Set(metadata.first_position),
            citation_count: Set(metadata.citation_count.unwrap_or(1)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        citation.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Find citation by ID
    pub async fn find_citation_by_id(&self, id: Uuid) -> Result<Option<Citation>> {
        CitationEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find the citation for a (citing, cited) pair
    pub async fn find_citation_by_pair(
        &self,
        citing_note_id: Uuid,
        cited_note_id: Uuid,
    ) -> Result<Option<Citation>> {
        CitationEntity::find()
            .filter(CitationColumn::CitingNoteId.eq(citing_note_id))
            .filter(CitationColumn::CitedNoteId.eq(cited_note_id))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Get the maximum citation order for a citing note (0 if none)
    pub async fn max_citation_order(&self, citing_note_id: Uuid) -> Result<i32> {
        let top = CitationEntity::find()
            .filter(CitationColumn::CitingNoteId.eq(citing_note_id))
            .order_by_desc(CitationColumn::CitationOrder)
            .one(self.read_conn())
            .await?;

        Ok(top.map(|c| c.citation_order).unwrap_or(0))
    }

    /// List outgoing citations from a note, ordered by citation order.
    /// Creation time breaks ties so duplicate orders still sort stably.
    pub async fn list_outgoing(&self, citing_note_id: Uuid) -> Result<Vec<Citation>> {
        CitationEntity::find()
            .filter(CitationColumn::CitingNoteId.eq(citing_note_id))
            .order_by_asc(CitationColumn::CitationOrder)
            .order_by_asc(CitationColumn::CreatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// List incoming citations to a note, newest first
    pub async fn list_incoming(&self, cited_note_id: Uuid) -> Result<Vec<Citation>> {
        CitationEntity::find()
            .filter(CitationColumn::CitedNoteId.eq(cited_note_id))
            .order_by_desc(CitationColumn::CreatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Count outgoing citations from a note
    pub async fn count_outgoing(&self, citing_note_id: Uuid) -> Result<u64> {
        CitationEntity::find()
            .filter(CitationColumn::CitingNoteId.eq(citing_note_id))
            .count(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Count incoming citations to a note
    pub async fn count_incoming(&self, cited_note_id: Uuid) -> Result<u64> {
        CitationEntity::find()
            .filter(CitationColumn::CitedNoteId.eq(cited_note_id))
            .count(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Apply a partial metadata update to an existing citation
    pub async fn update_citation(
        &self,
        citation: Citation,
        metadata: CitationMetadata,
    ) -> Result<Citation> {
        let mut active: CitationActiveModel = citation.into();

        if let Some(page_reference) = metadata.page_reference {
            active.page_reference = Set(Some(page_reference));
        }
        if let Some(inline_marker) = metadata.inline_marker {
            active.inline_marker = Set(Some(inline_marker));
        }
        if let Some(context) = metadata.context {
            active.context = Set(Some(context));
        }
        if let Some(first_position) = metadata.first_position {
            active.first_position = Set(Some(first_position));
        }
        if let Some(citation_count) = metadata.citation_count {
            active.citation_count = Set(citation_count);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        active.update(self.write_conn()).await.map_err(Into::into)
    }

    /// Delete a citation by ID
    pub async fn delete_citation(&self, id: Uuid) -> Result<bool> {
        let result = CitationEntity::delete_by_id(id)
            .exec(self.write_conn())
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Rewrite citation orders for a citing note in a single transaction.
    /// Each citation id is assigned order = index + 1; either every update
    /// applies or none do.
    pub async fn reorder_citations(
        &self,
        citing_note_id: Uuid,
        ordered_citation_ids: Vec<Uuid>,
    ) -> Result<()> {
        let now = chrono::Utc::now();

        self.write_conn()
            .transaction::<_, (), DbErr>(move |txn| {
                Box::pin(async move {
                    for (index, citation_id) in ordered_citation_ids.into_iter().enumerate() {
                        CitationEntity::update_many()
                            .col_expr(
                                CitationColumn::CitationOrder,
                                Expr::value((index + 1) as i32),
                            )
                            .col_expr(CitationColumn::UpdatedAt, Expr::value(now))
                            .filter(CitationColumn::Id.eq(citation_id))
                            .filter(CitationColumn::CitingNoteId.eq(citing_note_id))
                            .exec(txn)
                            .await?;
                    }
                    Ok(())
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db) => AppError::Database(db),
                TransactionError::Transaction(db) => AppError::Database(db),
            })
    }
}

//! Note entity
//!
//! Notes themselves are owned by the note-management service; the citation
//! engine only reads them: identifier lookup, ownership checks, and the
//! bibliographic fields the formatter needs.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Stable shareable identifier used in markers and links
    #[sea_orm(unique)]
    pub public_id: String,

    /// Owner of the note; only the owner may mutate its outgoing citations
    pub owner_id: Uuid,

    pub title: String,

    /// Markdown body scanned for citation markers
    #[sea_orm(column_type = "Text", nullable)]
    pub content: Option<String>,

    /// Free-text authors field, e.g. "Smith, J." or "Doe, A., Roe, B."
    pub authors: Option<String>,

    pub publication_year: Option<i32>,

    pub publisher: Option<String>,

    /// Explicit BibTeX-style key; falls back to public_id when absent
    pub citation_key: Option<String>,

    pub url: Option<String>,

    /// Kind of source this note captures (paper, research, article, ...)
    pub note_type: Option<String>,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

// Citations point here through two belongs_to relations on the citation
// entity; cascade is declared on that side.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

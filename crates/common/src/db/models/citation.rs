//! Citation entity for graph relationships
//!
//! Junction row linking a citing note to a cited note. The (citing, cited)
//! pair is unique; deleting either endpoint cascades through the FK.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "note_citations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Note that contains the citation
    pub citing_note_id: Uuid,

    /// Note that is being cited
    pub cited_note_id: Uuid,

    /// Order number for numbered citation styles, scoped per citing note
    pub citation_order: i32,

    /// Specific page(s) referenced, e.g. "p. 45" or "pp. 45-50"
    pub page_reference: Option<String>,

    /// The inline marker as it appears in the citing note's content
    pub inline_marker: Option<String>,

    /// Context or quote from the cited source
    #[sea_orm(column_type = "Text", nullable)]
    pub context: Option<String>,

    /// Character offset of the first occurrence in the content
    pub first_position: Option<i32>,

    /// Number of times the cited note is referenced in the citing note
    pub citation_count: i32,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::note::Entity",
        from = "Column::CitingNoteId",
        to = "super::note::Column::Id",
        on_delete = "Cascade"
    )]
    CitingNote,

    #[sea_orm(
        belongs_to = "super::note::Entity",
        from = "Column::CitedNoteId",
        to = "super::note::Column::Id",
        on_delete = "Cascade"
    )]
    CitedNote,
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{Iterable, RelationTrait};

    #[test]
    fn test_edge_declares_both_note_relations() {
        // Both FK sides live on the edge; the note entity declares none.
        assert_eq!(Relation::iter().count(), 2);
        assert_eq!(super::super::note::Relation::iter().count(), 0);

        let citing = Relation::CitingNote.def();
        let cited = Relation::CitedNote.def();
        assert!(format!("{:?}", citing).contains("notes"));
        assert!(format!("{:?}", cited).contains("notes"));
    }
}

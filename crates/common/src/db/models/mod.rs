//! SeaORM entity models
//!
//! Database entities for the NoteGraph citation engine

mod citation;
mod note;

pub use note::{
    Entity as NoteEntity,
    Model as Note,
    ActiveModel as NoteActiveModel,
    Column as NoteColumn,
};

pub use citation::{
    Entity as CitationEntity,
    Model as Citation,
    ActiveModel as CitationActiveModel,
    Column as CitationColumn,
};

//! Citation / knowledge-graph engine
//!
//! Maintains directed citation relationships between notes, extracts inline
//! `@note:` markers from note content, resolves them against the store, and
//! renders inline labels and bibliography entries across citation styles.
//!
//! Module layout:
//! - [`style`] — the closed set of supported citation styles
//! - [`scan`] — pure marker extraction over free text
//! - [`format`] — pure per-style label and reference formatting
//! - [`resolver`] — marker token to note resolution with fallback
//! - [`service`] — CRUD, query, stats and reorder over the citation store
//! - [`render`] — end-to-end rendering for a note

pub mod format;
pub mod render;
pub mod resolver;
pub mod scan;
pub mod service;
pub mod style;

pub use render::{ReferenceEntry, RenderResult, Renderer};
pub use resolver::NoteResolver;
pub use service::{CitationService, CitationStats};
pub use style::CitationStyle;

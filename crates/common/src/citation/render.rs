//! End-to-end citation rendering for a note
//!
//! Scans the note content for markers, resolves each one, assigns sequential
//! ordinals in first-occurrence order, and produces inline labels plus a
//! bibliography. Unresolved markers are excluded from the reference list and
//! reported through `warnings`.

use super::format;
use super::resolver::NoteResolver;
use super::scan::scan_markers;
use super::style::CitationStyle;
use crate::db::models::Note;
use crate::db::Repository;
use crate::errors::{AppError, Result};
use crate::metrics;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;
use uuid::Uuid;

/// One entry in the rendered bibliography, keyed by the marker token so the
/// caller can substitute labels back into the original content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceEntry {
    pub cited_note_id: Uuid,
    /// The marker token as written in the content
    pub public_id: String,
    pub formatted: String,
    pub title: String,
    pub authors: Option<String>,
    pub year: Option<i32>,
}

/// Result of rendering a note's citations in one style
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderResult {
    pub note_id: Uuid,
    pub style: CitationStyle,
    /// Original content, unmodified; label substitution is the caller's job
    pub processed_content: String,
    /// Marker token -> inline label
    pub inline_labels: BTreeMap<String, String>,
    /// Bibliography entries in ordinal order
    pub references: Vec<ReferenceEntry>,
    /// One warning per marker that could not be resolved
    pub warnings: Vec<String>,
}

/// Renderer orchestrating scan, resolution, and formatting
#[derive(Clone)]
pub struct Renderer {
    repo: Repository,
    resolver: NoteResolver,
}

impl Renderer {
    pub fn new(repo: Repository) -> Self {
        let resolver = NoteResolver::new(repo.clone());
        Self { repo, resolver }
    }

    /// Render all citations for a note. Read-only; ordinals are derived from
    /// first-occurrence order in the content, never from stored order values.
    pub async fn render(&self, note_id: Uuid, style: CitationStyle) -> Result<RenderResult> {
        let start = Instant::now();

        let note = self
            .repo
            .find_note_by_id(note_id)
            .await?
            .ok_or_else(|| AppError::NoteNotFound {
                id: note_id.to_string(),
            })?;

        // Index existing relationships by the cited note's public id so
        // markers backed by a relationship row skip the resolver.
        let citations = self.repo.list_outgoing(note_id).await?;
        let mut by_public_id: HashMap<String, Note> = HashMap::new();
        for citation in &citations {
            if let Some(cited) = self.repo.find_note_by_id(citation.cited_note_id).await? {
                by_public_id.insert(cited.public_id.clone(), cited);
            }
        }

        let content = note.content.clone().unwrap_or_default();
        let tokens = scan_markers(&content);

        let mut inline_labels = BTreeMap::new();
        let mut references = Vec::new();
        let mut warnings = Vec::new();
        let mut ordinal = 1usize;

        for token in tokens {
            let resolved = match by_public_id.get(&token) {
                Some(known) => Some(known.clone()),
                None => self.resolver.resolve(&token).await?,
            };

            let Some(cited) = resolved else {
                warnings.push(format!("Unresolved citation marker: @note:{}", token));
                continue;
            };

            inline_labels.insert(token.clone(), format::inline_label(&cited, style, ordinal));
            references.push(ReferenceEntry {
                cited_note_id: cited.id,
                public_id: token,
                formatted: format::full_reference(&cited, style, ordinal),
                title: cited.title,
                authors: cited.authors,
                year: cited.publication_year,
            });
            ordinal += 1;
        }

        metrics::record_render(
            start.elapsed().as_secs_f64(),
            style.as_str(),
            references.len(),
            warnings.len(),
        );

        Ok(RenderResult {
            note_id,
            style,
            processed_content: content,
            inline_labels,
            references,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::Citation;
    use crate::db::DbPool;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn note(public_id: &str, content: Option<&str>) -> Note {
        let now = chrono::Utc::now();
        Note {
            id: Uuid::new_v4(),
            public_id: public_id.to_string(),
            owner_id: Uuid::new_v4(),
            title: format!("Note {}", public_id),
            content: content.map(String::from),
            authors: Some("Smith, J.".to_string()),
            publication_year: Some(2021),
            publisher: None,
            citation_key: None,
            url: None,
            note_type: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn renderer(db: MockDatabase) -> Renderer {
        Renderer::new(Repository::new(DbPool {
            primary: std::sync::Arc::new(db.into_connection()),
            replica: None,
        }))
    }

    #[tokio::test]
    async fn test_render_deduplicates_markers() {
        // Spec scenario: one distinct marker used twice yields one [1] entry
        let citing = note("a1", Some("See @note:pub123 and @note:pub123 again."));
        let cited = note("pub123", None);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // citing note lookup, then empty outgoing list
            .append_query_results([vec![citing.clone()]])
            .append_query_results([Vec::<Citation>::new()])
            // the single distinct token resolves by public id
            .append_query_results([vec![cited.clone()]]);

        let result = renderer(db)
            .render(citing.id, CitationStyle::Ieee)
            .await
            .unwrap();

        assert_eq!(result.references.len(), 1);
        assert_eq!(result.references[0].cited_note_id, cited.id);
        assert_eq!(result.references[0].public_id, "pub123");
        assert_eq!(
            result.inline_labels,
            BTreeMap::from([("pub123".to_string(), "[1]".to_string())])
        );
        assert!(result.warnings.is_empty());
        assert_eq!(
            result.processed_content,
            "See @note:pub123 and @note:pub123 again."
        );
    }

    #[tokio::test]
    async fn test_render_unresolved_marker_becomes_warning() {
        let citing = note("a1", Some("See @note:ghost."));

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![citing.clone()]])
            .append_query_results([Vec::<Citation>::new()])
            // public-id lookup for "ghost" misses; not a UUID so no fallback
            .append_query_results([Vec::<Note>::new()]);

        let result = renderer(db)
            .render(citing.id, CitationStyle::Apa)
            .await
            .unwrap();

        assert!(result.references.is_empty());
        assert!(result.inline_labels.is_empty());
        assert_eq!(
            result.warnings,
            vec!["Unresolved citation marker: @note:ghost".to_string()]
        );
    }

    #[tokio::test]
    async fn test_render_empty_content() {
        let citing = note("a1", None);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![citing.clone()]])
            .append_query_results([Vec::<Citation>::new()]);

        let result = renderer(db)
            .render(citing.id, CitationStyle::Mla)
            .await
            .unwrap();

        assert!(result.inline_labels.is_empty());
        assert!(result.references.is_empty());
        assert!(result.warnings.is_empty());
        assert_eq!(result.processed_content, "");
    }

    #[tokio::test]
    async fn test_render_assigns_ordinals_in_first_occurrence_order() {
        let citing = note("a1", Some("@note:beta then @note:alpha."));
        let beta = note("beta", None);
        let alpha = note("alpha", None);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![citing.clone()]])
            .append_query_results([Vec::<Citation>::new()])
            .append_query_results([vec![beta.clone()], vec![alpha.clone()]]);

        let result = renderer(db)
            .render(citing.id, CitationStyle::Vancouver)
            .await
            .unwrap();

        assert_eq!(result.references.len(), 2);
        assert_eq!(result.references[0].public_id, "beta");
        assert_eq!(result.references[1].public_id, "alpha");
        assert_eq!(result.inline_labels["beta"], "[1]");
        assert_eq!(result.inline_labels["alpha"], "[2]");
    }

    #[tokio::test]
    async fn test_render_unknown_note_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Note>::new()]);

        let err = renderer(db)
            .render(Uuid::new_v4(), CitationStyle::Apa)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NoteNotFound { .. }));
    }
}

//! Citation graph handlers
//!
//! HTTP surface over the citation engine: relationship CRUD, queries,
//! reordering, and multi-style rendering.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use notegraph_common::{
    auth::AuthContext,
    citation::service::{CitedNoteSummary, CitingNoteSummary},
    citation::{CitationService, CitationStats, CitationStyle, RenderResult, Renderer},
    db::{models::Citation, CitationMetadata, Repository},
    errors::Result,
};

/// Simple confirmation payload for delete/reorder operations
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Optional metadata accepted when creating a citation
#[derive(Debug, Default, Deserialize)]
pub struct CreateCitationRequest {
    pub page_reference: Option<String>,
    pub inline_marker: Option<String>,
    pub context: Option<String>,
    pub first_position: Option<i32>,
    pub citation_count: Option<i32>,
}

/// Partial metadata update; absent fields are left untouched
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCitationRequest {
    pub page_reference: Option<String>,
    pub inline_marker: Option<String>,
    pub context: Option<String>,
    pub first_position: Option<i32>,
    pub citation_count: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct RenderParams {
    pub style: Option<String>,
}

impl From<CreateCitationRequest> for CitationMetadata {
    fn from(req: CreateCitationRequest) -> Self {
        CitationMetadata {
            page_reference: req.page_reference,
            inline_marker: req.inline_marker,
            context: req.context,
            first_position: req.first_position,
            citation_count: req.citation_count,
        }
    }
}

impl From<UpdateCitationRequest> for CitationMetadata {
    fn from(req: UpdateCitationRequest) -> Self {
        CitationMetadata {
            page_reference: req.page_reference,
            inline_marker: req.inline_marker,
            context: req.context,
            first_position: req.first_position,
            citation_count: req.citation_count,
        }
    }
}

fn service(state: &AppState) -> CitationService {
    CitationService::new(Repository::new(state.db.clone()))
}

// ============================================================================
// Create/Update/Delete Citations
// ============================================================================

/// Create a citation from one note to another
pub async fn create_citation(
    State(state): State<AppState>,
    auth: AuthContext,
    Path((note_id, referenced_note_id)): Path<(Uuid, Uuid)>,
    body: Option<Json<CreateCitationRequest>>,
) -> Result<(StatusCode, Json<Citation>)> {
    let request = body.map(|Json(r)| r).unwrap_or_default();

    let citation = service(&state)
        .create_citation(auth.user_id, note_id, referenced_note_id, request.into())
        .await?;

    Ok((StatusCode::CREATED, Json(citation)))
}

/// Update citation metadata
pub async fn update_citation(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(citation_id): Path<Uuid>,
    Json(request): Json<UpdateCitationRequest>,
) -> Result<Json<Citation>> {
    let citation = service(&state)
        .update_citation(auth.user_id, citation_id, request.into())
        .await?;

    Ok(Json(citation))
}

/// Delete a citation by ID
pub async fn delete_citation(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(citation_id): Path<Uuid>,
) -> Result<Json<MessageResponse>> {
    service(&state)
        .delete_citation(auth.user_id, citation_id)
        .await?;

    Ok(Json(MessageResponse {
        message: "Citation deleted".to_string(),
    }))
}

/// Delete a citation by note and referenced note IDs
pub async fn delete_citation_by_notes(
    State(state): State<AppState>,
    auth: AuthContext,
    Path((note_id, referenced_note_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<MessageResponse>> {
    service(&state)
        .delete_citation_by_pair(auth.user_id, note_id, referenced_note_id)
        .await?;

    Ok(Json(MessageResponse {
        message: "Citation deleted".to_string(),
    }))
}

// ============================================================================
// Query Citations
// ============================================================================

/// Get all outgoing citations from a note (notes this note cites)
pub async fn get_outgoing_citations(
    State(state): State<AppState>,
    Path(note_id): Path<Uuid>,
) -> Result<Json<Vec<Citation>>> {
    Ok(Json(service(&state).list_outgoing(note_id).await?))
}

/// Get all incoming citations to a note (notes that cite this note)
pub async fn get_incoming_citations(
    State(state): State<AppState>,
    Path(note_id): Path<Uuid>,
) -> Result<Json<Vec<Citation>>> {
    Ok(Json(service(&state).list_incoming(note_id).await?))
}

/// Get cited notes (notes referenced by a note) with summary info
pub async fn get_cited_notes(
    State(state): State<AppState>,
    Path(note_id): Path<Uuid>,
) -> Result<Json<Vec<CitedNoteSummary>>> {
    Ok(Json(service(&state).cited_notes(note_id).await?))
}

/// Get citing notes (notes that reference this note) with summary info
pub async fn get_citing_notes(
    State(state): State<AppState>,
    Path(note_id): Path<Uuid>,
) -> Result<Json<Vec<CitingNoteSummary>>> {
    Ok(Json(service(&state).citing_notes(note_id).await?))
}

/// Get citation statistics for a note
pub async fn get_citation_stats(
    State(state): State<AppState>,
    Path(note_id): Path<Uuid>,
) -> Result<Json<CitationStats>> {
    Ok(Json(service(&state).stats(note_id).await?))
}

// ============================================================================
// Reorder Citations
// ============================================================================

/// Reorder citations for a note; the body is the complete ordered id list
pub async fn reorder_citations(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(note_id): Path<Uuid>,
    Json(citation_ids): Json<Vec<Uuid>>,
) -> Result<Json<MessageResponse>> {
    service(&state)
        .reorder(auth.user_id, note_id, citation_ids)
        .await?;

    Ok(Json(MessageResponse {
        message: "Citations reordered".to_string(),
    }))
}

// ============================================================================
// Citation Rendering
// ============================================================================

/// Render citations for a note with inline labels and references
pub async fn render_citations(
    State(state): State<AppState>,
    Path(note_id): Path<Uuid>,
    Query(params): Query<RenderParams>,
) -> Result<Json<RenderResult>> {
    // Style validation happens before any content scanning
    let style: CitationStyle = params.style.as_deref().unwrap_or("APA").parse()?;

    let renderer = Renderer::new(Repository::new(state.db.clone()));
    let result = renderer.render(note_id, style).await?;

    Ok(Json(result))
}

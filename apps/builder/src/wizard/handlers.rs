//! Axum route handlers for wizard sessions.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::SessionContext;
use crate::state::AppState;
use crate::wizard::fields::{FieldEdit, FieldKey};
use crate::wizard::machine::{SubmitOutcome, WizardLayout, WizardSnapshot};
use crate::wizard::sessions::{submit_shared, SharedWizard};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub layout: Option<WizardLayout>,
}

#[derive(Debug, Deserialize)]
pub struct EditFieldRequest {
    pub step: usize,
    pub field: FieldKey,
    pub value: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    #[serde(flatten)]
    pub snapshot: WizardSnapshot,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub session_id: Uuid,
    #[serde(flatten)]
    pub outcome: SubmitOutcome,
}

async fn session(state: &AppState, id: Uuid) -> Result<SharedWizard, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Wizard session {id} not found")))
}

async fn respond(id: Uuid, wizard: &SharedWizard) -> Json<SessionResponse> {
    Json(SessionResponse {
        session_id: id,
        snapshot: wizard.lock().await.snapshot(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/wizard/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
    request: Option<Json<CreateSessionRequest>>,
) -> (StatusCode, Json<SessionResponse>) {
    let layout = request
        .and_then(|Json(r)| r.layout)
        .unwrap_or(state.config.default_layout);
    let (id, wizard) = state.sessions.create(layout).await;
    (StatusCode::CREATED, respond(id, &wizard).await)
}

/// GET /api/v1/wizard/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let wizard = session(&state, id).await?;
    Ok(respond(id, &wizard).await)
}

/// DELETE /api/v1/wizard/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Wizard session {id} not found")))
    }
}

/// PUT /api/v1/wizard/sessions/:id/fields
pub async fn handle_edit_field(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<EditFieldRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let edit = FieldEdit::from_parts(request.field, request.value).map_err(|e| {
        AppError::Validation(format!("invalid value for '{}': {e}", request.field.as_str()))
    })?;
    let wizard = session(&state, id).await?;
    wizard.lock().await.edit_field(request.step, edit)?;
    Ok(respond(id, &wizard).await)
}

/// POST /api/v1/wizard/sessions/:id/advance
pub async fn handle_advance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let wizard = session(&state, id).await?;
    wizard.lock().await.advance()?;
    Ok(respond(id, &wizard).await)
}

/// POST /api/v1/wizard/sessions/:id/retreat
pub async fn handle_retreat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let wizard = session(&state, id).await?;
    wizard.lock().await.retreat()?;
    Ok(respond(id, &wizard).await)
}

/// POST /api/v1/wizard/sessions/:id/reset
pub async fn handle_reset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let wizard = session(&state, id).await?;
    wizard.lock().await.reset()?;
    Ok(respond(id, &wizard).await)
}

/// POST /api/v1/wizard/sessions/:id/submit
///
/// The session lock is dropped for the duration of the generation request, so
/// edits and retreats keep working and a second submit sees the in-flight flag.
/// A client that disconnects mid-request does not leave the session in flight.
pub async fn handle_submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<SubmitResponse>, AppError> {
    let wizard = session(&state, id).await?;
    let ctx = SessionContext::from_headers(&headers);

    info!("Session {id} submitted");
    let outcome = submit_shared(
        wizard,
        state.generator.clone(),
        state.delivery.clone(),
        ctx,
    )
    .await?;

    Ok(Json(SubmitResponse {
        session_id: id,
        outcome,
    }))
}

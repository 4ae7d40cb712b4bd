//! Axum route handlers for analysis sessions.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::skill_match::match_skills;
use crate::session::controller::{run_analysis, AnalyzeOutcome, ClipboardDenied};
use crate::session::notice::Notice;
use crate::session::registry::SharedSession;
use crate::session::view::{JobView, MatchView, SessionView};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SetInputRequest {
    pub text: String,
}

/// `text` is absent when the browser could not read the clipboard.
#[derive(Debug, Deserialize)]
pub struct PasteRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NoticeResponse {
    pub session: SessionView,
    pub notice: Notice,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyzeStatus {
    Completed,
    Failed,
    Ignored,
    Superseded,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub session: SessionView,
    pub status: AnalyzeStatus,
    pub notice: Option<Notice>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeOnceRequest {
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeOnceResponse {
    pub job: JobView,
    pub skill_match: MatchView,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

async fn find(state: &AppState, id: Uuid) -> Result<SharedSession, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionView>) {
    let (id, session) = state.sessions.create().await;
    let view = SessionView::build(id, &*session.lock().await);
    (StatusCode::CREATED, Json(view))
}

/// GET /api/v1/sessions/:id
///
/// Recomputes a displayed match against the current profile before rendering.
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = find(&state, id).await?;
    let skills = state.profile.get_skills().await;
    let mut guard = session.lock().await;
    guard.refresh_match(&skills);
    Ok(Json(SessionView::build(id, &guard)))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Session {id} not found")))
    }
}

/// PUT /api/v1/sessions/:id/input
pub async fn handle_set_input(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SetInputRequest>,
) -> Result<Json<SessionView>, AppError> {
    let session = find(&state, id).await?;
    let mut guard = session.lock().await;
    guard.set_input(request.text);
    Ok(Json(SessionView::build(id, &guard)))
}

/// POST /api/v1/sessions/:id/paste
pub async fn handle_paste(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<PasteRequest>,
) -> Result<Json<NoticeResponse>, AppError> {
    let session = find(&state, id).await?;
    let mut guard = session.lock().await;
    let notice = guard.paste(request.text.ok_or(ClipboardDenied));
    Ok(Json(NoticeResponse {
        session: SessionView::build(id, &guard),
        notice,
    }))
}

/// POST /api/v1/sessions/:id/analyze
///
/// Waits for the extraction round trip. Blank input is a 400 and sends nothing;
/// an analyze while another is in flight returns `ignored` immediately.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let session = find(&state, id).await?;

    let outcome = run_analysis(
        session.clone(),
        state.extractor.clone(),
        state.profile.clone(),
    )
    .await;

    let (status, notice) = match outcome {
        AnalyzeOutcome::Rejected(notice) => return Err(AppError::Validation(notice.description)),
        AnalyzeOutcome::Completed(notice) => (AnalyzeStatus::Completed, Some(notice)),
        AnalyzeOutcome::Failed(notice) => (AnalyzeStatus::Failed, Some(notice)),
        AnalyzeOutcome::Ignored => (AnalyzeStatus::Ignored, None),
        AnalyzeOutcome::Superseded => (AnalyzeStatus::Superseded, None),
    };

    let guard = session.lock().await;
    Ok(Json(AnalyzeResponse {
        session: SessionView::build(id, &guard),
        status,
        notice,
    }))
}

/// POST /api/v1/sessions/:id/clear
pub async fn handle_clear(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = find(&state, id).await?;
    let mut guard = session.lock().await;
    guard.clear();
    Ok(Json(SessionView::build(id, &guard)))
}

/// POST /api/v1/analyze
///
/// One-shot analysis outside any session: extract, match against the profile, render.
pub async fn handle_analyze_once(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeOnceRequest>,
) -> Result<Json<AnalyzeOnceResponse>, AppError> {
    if request.description.trim().is_empty() {
        return Err(AppError::Validation(Notice::empty_input().description));
    }

    let job = state.extractor.extract(&request.description).await?;
    let skills = state.profile.get_skills().await;
    let skill_match = match_skills(&skills, &job.skills);

    Ok(Json(AnalyzeOnceResponse {
        job: JobView::from(&job),
        skill_match: MatchView::from(skill_match),
    }))
}

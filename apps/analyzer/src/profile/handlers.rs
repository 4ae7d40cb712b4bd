use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::profile::suggestions::available_suggestions;
use crate::profile::SkillSet;
use crate::session::notice::Notice;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddSkillRequest {
    pub skill: String,
}

#[derive(Serialize)]
pub struct SkillsResponse {
    pub skills: SkillSet,
}

#[derive(Serialize)]
pub struct SkillChangeResponse {
    pub skills: SkillSet,
    pub notice: Notice,
}

#[derive(Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<&'static str>,
}

/// GET /api/v1/profile/skills
pub async fn handle_get_skills(State(state): State<AppState>) -> Json<SkillsResponse> {
    Json(SkillsResponse {
        skills: state.profile.get_skills().await,
    })
}

/// POST /api/v1/profile/skills
pub async fn handle_add_skill(
    State(state): State<AppState>,
    Json(request): Json<AddSkillRequest>,
) -> Result<Json<SkillChangeResponse>, AppError> {
    if request.skill.trim().is_empty() {
        return Err(AppError::Validation("skill cannot be empty".to_string()));
    }

    let skills = state.profile.add_skill(&request.skill).await;
    Ok(Json(SkillChangeResponse {
        skills,
        notice: Notice::skill_added(request.skill.trim()),
    }))
}

/// DELETE /api/v1/profile/skills/:skill
pub async fn handle_remove_skill(
    State(state): State<AppState>,
    Path(skill): Path<String>,
) -> Json<SkillChangeResponse> {
    let skills = state.profile.remove_skill(&skill).await;
    Json(SkillChangeResponse {
        skills,
        notice: Notice::skill_removed(skill.trim()),
    })
}

/// GET /api/v1/profile/suggestions
pub async fn handle_suggestions(State(state): State<AppState>) -> Json<SuggestionsResponse> {
    let skills = state.profile.get_skills().await;
    Json(SuggestionsResponse {
        suggestions: available_suggestions(&skills),
    })
}

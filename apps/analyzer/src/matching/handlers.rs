use axum::{extract::State, Json};
use serde::Deserialize;

use crate::matching::skill_match::match_skills;
use crate::session::view::MatchView;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub job_skills: Vec<String>,
    /// Falls back to the stored profile when omitted.
    #[serde(default)]
    pub user_skills: Option<Vec<String>>,
}

/// POST /api/v1/match
pub async fn handle_match(
    State(state): State<AppState>,
    Json(request): Json<MatchRequest>,
) -> Json<MatchView> {
    let result = match request.user_skills {
        Some(user_skills) => match_skills(&user_skills, &request.job_skills),
        None => {
            let profile = state.profile.get_skills().await;
            match_skills(&profile, &request.job_skills)
        }
    };
    Json(MatchView::from(result))
}

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::graph::{build_trust_graph, TrustGraph};
use crate::input::{ProfileForm, ResumeDocument};
use crate::models::resume::Resume;
use crate::models::score::ScoreResult;
use crate::scoring_client::{GENERIC_PROFILE_FAILURE, GENERIC_UPLOAD_FAILURE};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ResumeSubmitted {
    pub epoch: u64,
    pub flags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileSubmitted {
    pub epoch: u64,
    pub trust_graph: TrustGraph,
}

/// POST /api/v1/resume
/// Multipart body with a single `file` part (.txt or .pdf).
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ResumeSubmitted>, AppError> {
    let mut selection: Option<(String, Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        selection = Some((file_name, content));
        break;
    }

    let document = ResumeDocument::from_selection(selection)?;
    let analysis = state
        .scoring
        .upload_resume(&document)
        .await
        .map_err(|e| AppError::Upstream {
            message: e.user_message(GENERIC_UPLOAD_FAILURE),
        })?;

    let resume = Resume::from_analysis(document.file_name, analysis);
    info!(
        "Resume '{}' analysed: {} flag(s)",
        resume.file_name,
        resume.flags.len()
    );
    let flags = resume.flags.clone();
    let epoch = state.orchestrator.submit_resume(resume);

    Ok(Json(ResumeSubmitted { epoch, flags }))
}

/// POST /api/v1/profile
pub async fn handle_submit_profile(
    State(state): State<AppState>,
    Json(form): Json<ProfileForm>,
) -> Result<Json<ProfileSubmitted>, AppError> {
    let profile = form.into_profile()?;
    let trust_graph = build_trust_graph(&profile);
    let epoch = state.orchestrator.submit_profile(profile);
    Ok(Json(ProfileSubmitted { epoch, trust_graph }))
}

/// POST /api/v1/profile/score
/// One-off score for a profile form. Does not change the current input.
pub async fn handle_preview_profile_score(
    State(state): State<AppState>,
    Json(form): Json<ProfileForm>,
) -> Result<Json<ScoreResult>, AppError> {
    let profile = form.into_profile()?;
    let result = state
        .scoring
        .score_profile(&profile)
        .await
        .map_err(|e| AppError::Upstream {
            message: e.user_message(GENERIC_PROFILE_FAILURE),
        })?;
    Ok(Json(result))
}

/// Scoring client: the single point of contact with the external scoring
/// service. No other module issues HTTP requests to it.
///
/// The service is treated as an opaque function from payload to
/// `ScoreResult`; everything here is transport and error mapping.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::input::ResumeDocument;
use crate::models::profile::Profile;
use crate::models::resume::ResumeAnalysis;
use crate::models::score::ScoreResult;

pub const GENERIC_SCORE_FAILURE: &str = "Failed to calculate realness score.";
pub const GENERIC_UPLOAD_FAILURE: &str = "Failed to analyze resume.";
pub const GENERIC_PROFILE_FAILURE: &str = "Error analyzing profile.";

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Scoring service error (status {status}): {}", .detail.as_deref().unwrap_or("no detail"))]
    Api { status: u16, detail: Option<String> },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ScoreError {
    /// Message suitable for showing to the user: the service's `detail`
    /// verbatim when it sent one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ScoreError::Api {
                detail: Some(detail),
                ..
            } => detail.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// What gets sent to `GET /score/`. Exactly one input drives a request.
#[derive(Debug, Clone, PartialEq)]
pub enum ScorePayload {
    ResumeText(String),
    ProfileData(Profile),
}

impl ScorePayload {
    /// Query parameters for `GET /score/`. The profile travels as a JSON string.
    pub fn query_params(&self) -> Result<Vec<(&'static str, String)>, serde_json::Error> {
        Ok(match self {
            ScorePayload::ResumeText(text) => vec![("resume_text", text.clone())],
            ScorePayload::ProfileData(profile) => {
                vec![("profile_data", serde_json::to_string(profile)?)]
            }
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ScorePayload::ResumeText(_) => "resume_text",
            ScorePayload::ProfileData(_) => "profile_data",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

/// The scoring service seam. `ScoreOrchestrator` holds an `Arc<dyn ScoringClient>`
/// so tests can substitute a scripted implementation.
#[async_trait]
pub trait ScoringClient: Send + Sync {
    /// `GET /score/` with either `resume_text` or `profile_data`.
    async fn fetch_score(&self, payload: &ScorePayload) -> Result<ScoreResult, ScoreError>;

    /// `POST /profile/score` with the profile as a JSON body.
    async fn score_profile(&self, profile: &Profile) -> Result<ScoreResult, ScoreError>;

    /// `POST /resume/upload` with the document as the multipart `file` part.
    async fn upload_resume(&self, document: &ResumeDocument)
        -> Result<ResumeAnalysis, ScoreError>;
}

/// reqwest-backed client for the scoring service.
#[derive(Clone)]
pub struct HttpScoringClient {
    client: Client,
    base_url: String,
}

impl HttpScoringClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ScoreError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl ScoringClient for HttpScoringClient {
    async fn fetch_score(&self, payload: &ScorePayload) -> Result<ScoreResult, ScoreError> {
        let params = payload.query_params()?;
        debug!("Requesting realness score ({})", payload.kind());

        let response = self
            .client
            .get(self.url("/score/"))
            .query(&params)
            .send()
            .await?;

        let result: ScoreResult = read_json(response).await?;
        debug!("Realness score received: {}", result.realness_score);
        Ok(result)
    }

    async fn score_profile(&self, profile: &Profile) -> Result<ScoreResult, ScoreError> {
        let response = self
            .client
            .post(self.url("/profile/score"))
            .json(profile)
            .send()
            .await?;

        read_json(response).await
    }

    async fn upload_resume(
        &self,
        document: &ResumeDocument,
    ) -> Result<ResumeAnalysis, ScoreError> {
        let part = multipart::Part::bytes(document.content.to_vec())
            .file_name(document.file_name.clone())
            .mime_str(document.mime_type())?;
        let form = multipart::Form::new().part("file", part);

        debug!(
            "Uploading resume '{}' ({} bytes)",
            document.file_name,
            document.content.len()
        );

        let response = self
            .client
            .post(self.url("/resume/upload"))
            .multipart(form)
            .send()
            .await?;

        read_json(response).await
    }
}

/// Maps non-2xx responses to `ScoreError::Api` (keeping a string `detail`
/// when the body carries one) and parses successful bodies as `T`.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ScoreError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        warn!("Scoring service returned {}: {}", status, body);
        let detail = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.detail)
            .and_then(|d| d.as_str().map(str::to_string));
        return Err(ScoreError::Api {
            status: status.as_u16(),
            detail,
        });
    }

    Ok(serde_json::from_str(&body)?)
}

use serde::{Deserialize, Serialize};

/// The scoring service's analysis of an uploaded resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeAnalysis {
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default)]
    pub ai_likelihood_score: Option<f64>,
}

/// An uploaded resume after the scoring service has extracted its signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resume {
    pub file_name: String,
    pub flags: Vec<String>,
    pub ai_likelihood_score: Option<f64>,
}

impl Resume {
    pub fn from_analysis(file_name: impl Into<String>, analysis: ResumeAnalysis) -> Self {
        Self {
            file_name: file_name.into(),
            flags: analysis.flags,
            ai_likelihood_score: analysis.ai_likelihood_score,
        }
    }
}

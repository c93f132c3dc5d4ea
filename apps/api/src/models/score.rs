use serde::{Deserialize, Serialize};

pub const MAX_REALNESS_SCORE: f64 = 100.0;

/// The four independently optional scoring modes the service may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailMode {
    Experience,
    Education,
    Skill,
    ResumeAi,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceBreakdown {
    pub score: f64,
    pub years: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationBreakdown {
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillBreakdown {
    pub score: f64,
    pub matched: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeAiBreakdown {
    pub score: f64,
    /// Raw AI-likelihood percentage before inversion, when reported.
    pub likelihood: Option<f64>,
    pub flags: Vec<String>,
}

/// Per-mode breakdown of a realness score.
///
/// On the wire this is the flat `details` object keyed by `experience_score`,
/// `experience_years`, `education_score`, `skill_score`, `matched_skills`,
/// `resume_ai_score`, `resume_ai_likelihood` and `resume_flags`. A mode is
/// present exactly when its `*_score` key is; companion keys without their
/// score are ignored, as are unknown keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireDetails", into = "WireDetails")]
pub struct ScoreBreakdown {
    pub experience: Option<ExperienceBreakdown>,
    pub education: Option<EducationBreakdown>,
    pub skill: Option<SkillBreakdown>,
    pub resume_ai: Option<ResumeAiBreakdown>,
}

impl ScoreBreakdown {
    /// Modes present in this breakdown, in display order.
    pub fn modes(&self) -> Vec<DetailMode> {
        let mut modes = Vec::with_capacity(4);
        if self.experience.is_some() {
            modes.push(DetailMode::Experience);
        }
        if self.education.is_some() {
            modes.push(DetailMode::Education);
        }
        if self.skill.is_some() {
            modes.push(DetailMode::Skill);
        }
        if self.resume_ai.is_some() {
            modes.push(DetailMode::ResumeAi);
        }
        modes
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct WireDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    experience_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    experience_years: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    education_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    skill_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    matched_skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resume_ai_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resume_ai_likelihood: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resume_flags: Option<Vec<String>>,
}

impl From<WireDetails> for ScoreBreakdown {
    fn from(wire: WireDetails) -> Self {
        Self {
            experience: wire.experience_score.map(|score| ExperienceBreakdown {
                score,
                years: wire.experience_years,
            }),
            education: wire
                .education_score
                .map(|score| EducationBreakdown { score }),
            skill: wire.skill_score.map(|score| SkillBreakdown {
                score,
                matched: wire.matched_skills.unwrap_or_default(),
            }),
            resume_ai: wire.resume_ai_score.map(|score| ResumeAiBreakdown {
                score,
                likelihood: wire.resume_ai_likelihood,
                flags: wire.resume_flags.unwrap_or_default(),
            }),
        }
    }
}

impl From<ScoreBreakdown> for WireDetails {
    fn from(b: ScoreBreakdown) -> Self {
        let mut wire = WireDetails::default();
        if let Some(exp) = b.experience {
            wire.experience_score = Some(exp.score);
            wire.experience_years = exp.years;
        }
        if let Some(edu) = b.education {
            wire.education_score = Some(edu.score);
        }
        if let Some(skill) = b.skill {
            wire.skill_score = Some(skill.score);
            wire.matched_skills = Some(skill.matched);
        }
        if let Some(ai) = b.resume_ai {
            wire.resume_ai_score = Some(ai.score);
            wire.resume_ai_likelihood = ai.likelihood;
            wire.resume_flags = Some(ai.flags);
        }
        wire
    }
}

/// A realness score as returned by the scoring service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireScoreResult")]
pub struct ScoreResult {
    /// Always within `0.0..=100.0`.
    pub realness_score: f64,
    pub details: ScoreBreakdown,
}

#[derive(Deserialize)]
struct WireScoreResult {
    realness_score: f64,
    #[serde(default)]
    details: Option<ScoreBreakdown>,
}

impl TryFrom<WireScoreResult> for ScoreResult {
    type Error = String;

    fn try_from(wire: WireScoreResult) -> Result<Self, Self::Error> {
        if !wire.realness_score.is_finite() {
            return Err(format!(
                "realness_score must be a finite number, got {}",
                wire.realness_score
            ));
        }
        let clamped = wire.realness_score.clamp(0.0, MAX_REALNESS_SCORE);
        if clamped != wire.realness_score {
            tracing::warn!(
                "realness_score {} outside 0-100, clamped to {}",
                wire.realness_score,
                clamped
            );
        }
        Ok(Self {
            realness_score: clamped,
            details: wire.details.unwrap_or_default(),
        })
    }
}

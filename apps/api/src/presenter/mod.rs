use std::fmt;

use serde::Serialize;

use crate::models::score::{DetailMode, ScoreBreakdown, ScoreResult};
use crate::orchestrator::{ScoreState, ScoreView};

pub const LOADING_MESSAGE: &str = "Calculating realness score...";
pub const PLACEHOLDER_MESSAGE: &str =
    "Upload a resume or analyze a profile to get the Realness Score.";

/// Fixed labels for the per-mode breakdown lines.
pub const EXPERIENCE_LABEL: &str = "Experience Score";
pub const YEARS_LABEL: &str = "Years";
pub const EDUCATION_LABEL: &str = "Education Score";
pub const SKILL_LABEL: &str = "Skills Score";
pub const MATCHED_SKILLS_LABEL: &str = "Matched Skills";
pub const RESUME_AI_LABEL: &str = "Resume AI Likelihood Score";
pub const RESUME_FLAGS_LABEL: &str = "Flags";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownLine {
    pub mode: DetailMode,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreDisplay {
    Loading { message: &'static str },
    Placeholder { message: &'static str },
    Score {
        headline: String,
        breakdown: Vec<BreakdownLine>,
    },
}

/// Renders a score state. Only breakdown modes that are present get a line.
pub fn present(state: &ScoreState) -> ScoreDisplay {
    match state {
        ScoreState::Loading => ScoreDisplay::Loading {
            message: LOADING_MESSAGE,
        },
        ScoreState::Empty => ScoreDisplay::Placeholder {
            message: PLACEHOLDER_MESSAGE,
        },
        ScoreState::Ready(result) => present_result(result),
    }
}

/// Display lines for a full view: an `Error:` line first when the view
/// carries one, then the rendered state.
pub fn render_lines(view: &ScoreView) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(error) = &view.error {
        lines.push(format!("Error: {error}"));
    }
    lines.extend(present(&view.state).to_string().lines().map(str::to_string));
    lines
}

fn present_result(result: &ScoreResult) -> ScoreDisplay {
    ScoreDisplay::Score {
        headline: format!("Realness Score: {} / 100", fmt_number(result.realness_score)),
        breakdown: result
            .details
            .modes()
            .into_iter()
            .filter_map(|mode| breakdown_line(&result.details, mode))
            .collect(),
    }
}

fn breakdown_line(details: &ScoreBreakdown, mode: DetailMode) -> Option<BreakdownLine> {
    let text = match mode {
        DetailMode::Experience => {
            let exp = details.experience.as_ref()?;
            match exp.years {
                Some(years) => format!(
                    "{EXPERIENCE_LABEL}: {} ({YEARS_LABEL}: {years})",
                    fmt_number(exp.score)
                ),
                None => format!("{EXPERIENCE_LABEL}: {}", fmt_number(exp.score)),
            }
        }
        DetailMode::Education => {
            let edu = details.education.as_ref()?;
            format!("{EDUCATION_LABEL}: {}", fmt_number(edu.score))
        }
        DetailMode::Skill => {
            let skill = details.skill.as_ref()?;
            format!(
                "{SKILL_LABEL}: {} | {MATCHED_SKILLS_LABEL}: {}",
                fmt_number(skill.score),
                join_or_none(&skill.matched)
            )
        }
        DetailMode::ResumeAi => {
            let ai = details.resume_ai.as_ref()?;
            format!(
                "{RESUME_AI_LABEL}: {} | {RESUME_FLAGS_LABEL}: {}",
                fmt_number(ai.score),
                join_or_none(&ai.flags)
            )
        }
    };
    Some(BreakdownLine { mode, text })
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(", ")
    }
}

/// Whole numbers print bare; anything else gets at most two decimals.
fn fmt_number(value: f64) -> String {
    if value.fract() == 0.0 {
        return format!("{value:.0}");
    }
    let fixed = format!("{value:.2}");
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

impl fmt::Display for ScoreDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreDisplay::Loading { message } | ScoreDisplay::Placeholder { message } => {
                write!(f, "{message}")
            }
            ScoreDisplay::Score {
                headline,
                breakdown,
            } => {
                write!(f, "{headline}")?;
                for line in breakdown {
                    write!(f, "\n- {}", line.text)?;
                }
                Ok(())
            }
        }
    }
}

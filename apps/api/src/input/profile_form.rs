use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::input::InputError;
use crate::models::profile::{Education, Experience, Profile};

/// Raw profile form input. `skills` is the comma-separated text the user typed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileForm {
    pub name: String,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: String,
}

/// Splits raw skill input on `,`, trims each piece and drops empty pieces.
pub fn normalize_skills(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl ProfileForm {
    /// Validates the form and builds a `Profile`.
    ///
    /// Name and every text field of every entry must be non-blank, both entry
    /// lists must be non-empty and at least one skill must survive
    /// normalization. Text fields are trimmed.
    pub fn into_profile(self) -> Result<Profile, InputError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(InputError::MissingName);
        }

        if self.experience.is_empty() {
            return Err(InputError::MissingEntries("experience"));
        }
        if self.education.is_empty() {
            return Err(InputError::MissingEntries("education"));
        }

        let experience = self
            .experience
            .into_iter()
            .enumerate()
            .map(|(index, exp)| {
                Ok(Experience {
                    role: required("experience", index, "role", &exp.role)?,
                    company: required("experience", index, "company", &exp.company)?,
                    years: exp.years,
                })
            })
            .collect::<Result<Vec<_>, InputError>>()?;

        let education = self
            .education
            .into_iter()
            .enumerate()
            .map(|(index, edu)| {
                Ok(Education {
                    degree: required("education", index, "degree", &edu.degree)?,
                    university: required("education", index, "university", &edu.university)?,
                    year: edu.year,
                })
            })
            .collect::<Result<Vec<_>, InputError>>()?;

        let skills = normalize_skills(&self.skills);
        if skills.is_empty() {
            return Err(InputError::NoSkills);
        }

        Ok(Profile {
            name,
            experience,
            education,
            skills,
        })
    }
}

fn required(
    section: &'static str,
    index: usize,
    field: &'static str,
    value: &str,
) -> Result<String, InputError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(InputError::BlankField {
            section,
            index,
            field,
        });
    }
    Ok(trimmed.to_string())
}

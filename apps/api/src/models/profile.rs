use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub role: String,
    pub company: String,
    pub years: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Education {
    pub degree: String,
    pub university: String,
    pub year: i32,
}

/// A validated career profile. Built from a `ProfileForm` by the input layer,
/// so every field here already satisfies the submission rules.
///
/// Serializes to the shape the scoring service expects:
/// `{name, experience: [...], education: [...], skills: [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: BTreeSet<String>,
}

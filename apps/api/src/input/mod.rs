//! Input collection: turns raw user submissions into a validated `Profile`
//! or an uploadable `ResumeDocument`. Nothing in here talks to the scoring
//! endpoint; rejected input never reaches the orchestrator.

pub mod handlers;
pub mod profile_form;
pub mod resume;

use thiserror::Error;

pub use profile_form::ProfileForm;
pub use resume::ResumeDocument;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Please select a resume file (.txt or .pdf)")]
    NoFile,

    #[error("Only .txt or .pdf files supported, got '{0}'")]
    UnsupportedFileType(String),

    #[error("Resume file '{0}' is empty")]
    EmptyFile(String),

    #[error("Name is required")]
    MissingName,

    #[error("At least one {0} entry is required")]
    MissingEntries(&'static str),

    #[error("{section} entry {index}: '{field}' is required")]
    BlankField {
        section: &'static str,
        index: usize,
        field: &'static str,
    },

    #[error("At least one skill is required")]
    NoSkills,
}

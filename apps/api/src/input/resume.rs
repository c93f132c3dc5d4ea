use bytes::Bytes;

use crate::input::InputError;

const ACCEPTED_EXTENSIONS: &[&str] = &[".txt", ".pdf"];

/// A resume file selected for upload. Content is opaque here; text
/// extraction and analysis happen in the scoring service.
#[derive(Debug, Clone)]
pub struct ResumeDocument {
    pub file_name: String,
    pub content: Bytes,
}

impl ResumeDocument {
    pub fn new(file_name: impl Into<String>, content: impl Into<Bytes>) -> Result<Self, InputError> {
        let file_name = file_name.into();
        let content = content.into();

        let lower = file_name.to_lowercase();
        if !ACCEPTED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
            return Err(InputError::UnsupportedFileType(file_name));
        }
        if content.is_empty() {
            return Err(InputError::EmptyFile(file_name));
        }

        Ok(Self { file_name, content })
    }

    /// Validates an optional selection; `None` means no file was picked.
    pub fn from_selection(selection: Option<(String, Bytes)>) -> Result<Self, InputError> {
        let (file_name, content) = selection.ok_or(InputError::NoFile)?;
        Self::new(file_name, content)
    }

    pub fn mime_type(&self) -> &'static str {
        if self.file_name.to_lowercase().ends_with(".pdf") {
            "application/pdf"
        } else {
            "text/plain"
        }
    }
}

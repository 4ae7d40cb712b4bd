use serde::Serialize;

use crate::extraction::ExtractionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A transient, user-visible message (rendered as a toast by the front end).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn empty_input() -> Self {
        Self::error(
            "No job description",
            "Please paste a job description to analyze",
        )
    }

    pub fn analysis_complete() -> Self {
        Self::info(
            "Analysis complete",
            "Job description has been parsed successfully",
        )
    }

    pub fn analysis_failed(err: &ExtractionError) -> Self {
        Self::error("Analysis failed", failure_message(err))
    }

    pub fn analysis_interrupted() -> Self {
        Self::error(
            "Analysis failed",
            "The analysis was interrupted before it finished. Try again.",
        )
    }

    pub fn pasted() -> Self {
        Self::info("Pasted from clipboard", "Job description has been pasted")
    }

    pub fn paste_unavailable() -> Self {
        Self::error("Unable to paste", "Please paste manually using Ctrl+V")
    }

    pub fn skill_added(skill: &str) -> Self {
        Self::info(
            "Skill added",
            format!("\"{skill}\" has been added to your profile"),
        )
    }

    pub fn skill_removed(skill: &str) -> Self {
        Self::info(
            "Skill removed",
            format!("\"{skill}\" has been removed from your profile"),
        )
    }
}

/// User-facing wording for an extraction failure. Raw transport detail stays in the logs.
pub fn failure_message(err: &ExtractionError) -> String {
    match err {
        ExtractionError::Http(e) if e.is_timeout() => {
            "The extraction service took too long to respond. Try again.".to_string()
        }
        ExtractionError::Http(_) => {
            "Could not reach the extraction service. Check that it is running and try again."
                .to_string()
        }
        ExtractionError::Status { status, .. } => {
            format!("The extraction service returned an error (status {status}). Try again.")
        }
        ExtractionError::Parse(_) => {
            "The extraction service returned a response that could not be read.".to_string()
        }
    }
}

//! Error taxonomy for conversion and template analysis
//!
//! Per-file errors are caught at the file boundary in batch mode; recoverable
//! style-extraction problems surface as warnings, not errors.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("input not found: {0}")]
    InputNotFound(PathBuf),

    #[error("not a valid .docx template: {path}: {reason}")]
    InvalidTemplate { path: PathBuf, reason: String },

    #[error("template analysis failed: {0}")]
    TemplateAnalysis(String),

    #[error("template '{0}' is not registered in the library")]
    UnknownTemplate(String),

    #[error("failed to write output to {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize document: {0}")]
    Serialize(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type ConvertResult<T> = Result<T, ConvertError>;

/// A recoverable problem noticed while extracting one style or document part.
///
/// Collected into a list instead of being swallowed, so callers can report
/// which attributes were omitted from an otherwise successful analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionWarning {
    /// Style id or document part the warning refers to.
    pub subject: String,
    pub detail: String,
}

impl ExtractionWarning {
    pub fn new(subject: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.subject, self.detail)
    }
}

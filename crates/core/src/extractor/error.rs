//! Error types for the extractor module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during extraction.
#[derive(Debug, Error)]
pub enum ExtractorError {
    /// External tool binary not found.
    #[error("Tool not found at path: {path}")]
    ToolNotFound { path: PathBuf },

    /// The extraction process failed.
    #[error("Extraction failed: {reason}")]
    ExtractionFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// The tool reported success but the expected output is absent.
    #[error("Expected output file missing: {path}")]
    OutputMissing { path: PathBuf },

    /// Extraction timed out.
    #[error("Extraction timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// I/O error during extraction.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractorError {
    /// Creates a new extraction failed error with stderr output.
    pub fn extraction_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::ExtractionFailed {
            reason: reason.into(),
            stderr,
        }
    }
}

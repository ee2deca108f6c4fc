//! Types for the queue module.

use std::path::PathBuf;
use thiserror::Error;

use crate::extractor::TransformKind;

/// A completed media item awaiting relay.
///
/// All fields are recovered from the artifact's filename; the file itself
/// is the only storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Location on disk (completion-marked name).
    pub path: PathBuf,
    /// Chat the artifact must be relayed to.
    pub destination: i64,
    /// Transform the artifact went through, recovered from its extension.
    pub kind: TransformKind,
}

impl Artifact {
    /// The artifact's bare filename.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Errors that can occur while operating on the queue directory.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

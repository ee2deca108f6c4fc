//! Types for the extractor module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How a fetched media item is transformed before relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    /// Full re-encode, bitrate and resolution bounded for chat delivery.
    Video,
    /// Audio-only extraction.
    Audio,
    /// Short silent scaled-down clip, delivered as an animation.
    Clip,
}

impl TransformKind {
    /// File extension of the produced artifact.
    pub fn extension(&self) -> &'static str {
        match self {
            TransformKind::Video => "mp4",
            TransformKind::Audio => "mp3",
            TransformKind::Clip => "gif",
        }
    }

    /// Recovers the kind from an artifact extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "mp4" => Some(TransformKind::Video),
            "mp3" => Some(TransformKind::Audio),
            "gif" => Some(TransformKind::Clip),
            _ => None,
        }
    }
}

/// A single extraction job handed to the external tool.
#[derive(Debug, Clone)]
pub struct ExtractionJob {
    /// Source media URL.
    pub url: String,
    /// Where the transformed artifact must end up.
    pub output_path: PathBuf,
    /// Transform applied by the post-processing command.
    pub kind: TransformKind,
    /// Outbound proxy as `host:port`, empty for a direct connection.
    pub proxy: String,
}

/// Outcome of a successful extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Path of the produced artifact.
    pub output_path: PathBuf,
    /// Size of the produced artifact in bytes.
    pub output_size_bytes: u64,
    /// Wall-clock duration of the whole pass in milliseconds.
    pub duration_ms: u64,
}

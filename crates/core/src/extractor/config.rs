//! Configuration for the extractor module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the yt-dlp based extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Path to the yt-dlp binary.
    #[serde(default = "default_ytdlp_path")]
    pub ytdlp_path: PathBuf,

    /// Path to the ffmpeg binary used by the post-processing command.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Quality/format selection passed to the tool.
    #[serde(default = "default_format_selector")]
    pub format_selector: String,

    /// Timeout for a single extraction in seconds. Unset means no enforced
    /// timeout; a stuck tool then holds its request task indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Additional yt-dlp arguments appended to every invocation.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_ytdlp_path() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_format_selector() -> String {
    "bestvideo+bestaudio/best".to_string()
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: default_ytdlp_path(),
            ffmpeg_path: default_ffmpeg_path(),
            format_selector: default_format_selector(),
            timeout_secs: None,
            extra_args: Vec::new(),
        }
    }
}

impl ExtractorConfig {
    /// Creates a new config with custom tool paths.
    pub fn with_paths(ytdlp_path: PathBuf, ffmpeg_path: PathBuf) -> Self {
        Self {
            ytdlp_path,
            ffmpeg_path,
            ..Default::default()
        }
    }

    /// Sets the extraction timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }
}

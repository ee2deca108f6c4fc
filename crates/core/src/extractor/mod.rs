//! Extractor module for fetching remote media through an external tool.
//!
//! This module provides the `Extractor` trait and the yt-dlp based
//! implementation. An extraction job names a source URL, an output path and
//! a transform kind; the tool downloads the media and a post-processing
//! command rewrites it into the delivery format (re-encoded video, audio
//! track, or a short silent clip).

mod config;
mod error;
mod traits;
mod types;
mod ytdlp;

pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use traits::Extractor;
pub use types::{ExtractionJob, ExtractionResult, TransformKind};
pub use ytdlp::YtdlpExtractor;

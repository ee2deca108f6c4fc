//! Trait definitions for the extractor module.

use async_trait::async_trait;

use super::error::ExtractorError;
use super::types::{ExtractionJob, ExtractionResult};

/// An extractor that can fetch and transform remote media.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Returns the name of this extractor implementation.
    fn name(&self) -> &str;

    /// Fetches the media named by the job and produces the output file.
    ///
    /// On success the artifact exists at `job.output_path`. On failure no
    /// file may exist at that path; partially written intermediates are the
    /// caller's garbage to ignore.
    async fn fetch(&self, job: ExtractionJob) -> Result<ExtractionResult, ExtractorError>;

    /// Validates that the external tools are available.
    async fn validate(&self) -> Result<(), ExtractorError>;
}

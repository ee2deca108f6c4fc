//! Types for the fetcher module.

use thiserror::Error;

use crate::extractor::{ExtractorError, TransformKind};
use crate::queue::QueueError;

/// One inbound retrieval request, owned by the task handling it.
#[derive(Debug, Clone)]
pub struct RetrievalRequest {
    /// Source media URL as received from the requester.
    pub source_url: String,
    /// Chat the resulting artifact must be relayed to.
    pub destination: i64,
    /// Transform applied before relay.
    pub kind: TransformKind,
    /// Whether the first attempt already goes through the current proxy.
    pub use_proxy: bool,
}

/// Errors a retrieval can end with.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The request itself is unusable; reported to the requester, never
    /// retried, and no file is created.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Extraction failed terminally, proxy fallback included.
    #[error("retrieval failed: {source}")]
    RetrievalFailed {
        #[source]
        source: ExtractorError,
    },

    /// The artifact could not be placed into the queue.
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),
}

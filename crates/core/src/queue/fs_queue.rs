//! Filesystem-backed artifact queue.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use super::naming::{
    self, parse_finished_name, working_file_name, NamingError, FILE_PREFIX,
};
use super::types::{Artifact, QueueError};
use crate::extractor::TransformKind;

/// The flat directory holding artifacts, addressed purely by filename.
#[derive(Debug, Clone)]
pub struct ArtifactQueue {
    dir: PathBuf,
}

impl ArtifactQueue {
    /// Creates a queue rooted at the given directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The queue directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Ensures the queue directory exists.
    pub async fn ensure_dir(&self) -> Result<(), QueueError> {
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Allocates a fresh working path for a new artifact.
    ///
    /// The random uniqueness token guarantees concurrent requests for the
    /// same destination never collide.
    pub fn working_path(&self, destination: i64, kind: TransformKind) -> PathBuf {
        let token = Uuid::new_v4().to_string();
        self.dir.join(working_file_name(destination, &token, kind))
    }

    /// Publishes a fully written working file.
    ///
    /// The rename is atomic within the queue directory: scanners observe
    /// either the invisible working name or the complete marked name,
    /// never a partial artifact under the marked name.
    pub async fn publish(&self, working: &Path) -> Result<PathBuf, QueueError> {
        let finished = naming::finished_path(working);
        fs::rename(working, &finished).await?;
        debug!("Published artifact {:?}", finished);
        Ok(finished)
    }

    /// Lists completed artifacts currently on disk.
    ///
    /// In-progress files are skipped silently; files that carry the
    /// completion marker but do not parse are logged and skipped, so a
    /// corrupt name can never route bytes to the wrong chat.
    pub async fn scan(&self) -> Result<Vec<Artifact>, QueueError> {
        let mut artifacts = Vec::new();

        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(artifacts),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if !name.starts_with(FILE_PREFIX) {
                continue;
            }

            match parse_finished_name(name) {
                Ok((destination, kind)) => artifacts.push(Artifact {
                    path: entry.path(),
                    destination,
                    kind,
                }),
                Err(NamingError::NotFinished) => {
                    // Still being written.
                }
                Err(e) => {
                    warn!("Skipping malformed artifact name {:?}: {}", name, e);
                }
            }
        }

        Ok(artifacts)
    }

    /// Removes a delivered artifact, reclaiming storage.
    pub async fn remove(&self, artifact: &Artifact) -> Result<(), QueueError> {
        fs::remove_file(&artifact.path).await?;
        debug!("Removed artifact {:?}", artifact.path);
        Ok(())
    }
}

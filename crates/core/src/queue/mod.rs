//! Work queue module: the filesystem handoff between download and relay.
//!
//! An artifact's filename carries all of its routing metadata:
//! `tgbot_{encoded_destination}_{uniqueness_token}.{ext}` while the file is
//! being written, with a fixed `tgok` marker appended to the stem once the
//! artifact is complete. Completion is published with an atomic rename, so
//! a scanner either sees the finished name or nothing.

mod fs_queue;
mod naming;
mod types;

pub use fs_queue::ArtifactQueue;
pub use naming::{
    decode_destination, encode_destination, finished_path, parse_finished_name,
    working_file_name, NamingError, FILE_PREFIX, FINISHED_MARKER,
};
pub use types::{Artifact, QueueError};

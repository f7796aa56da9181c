//! Unified error type for hlsrec.
//!
//! All crates funnel their failures into [`Error`]. Most variants describe a
//! failure local to one segment or to manifest setup; callers decide whether
//! to log and continue (the recording path) or to bail (the CLI).

use std::path::PathBuf;

use crate::media::MediaType;

/// Unified error type covering all failure modes in hlsrec.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The playlist file could not be created.
    #[error("Could not create manifest file {}: {source}", path.display())]
    FileCreationFailed {
        /// Target playlist path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The playlist file already exists and is left untouched.
    #[error("Manifest file already exists: {}", path.display())]
    ManifestExists {
        /// Existing playlist path.
        path: PathBuf,
    },

    /// An entry was appended after `#EXT-X-ENDLIST` was written.
    #[error("Manifest is already finalized")]
    ManifestFinalized,

    /// Segment bytes could not be written to disk.
    #[error("Failed to write segment file {}: {source}", path.display())]
    SegmentWriteFailed {
        /// Segment file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A media segment arrived without a timing report for the given track type.
    #[error("Segment report has no {media_type} track")]
    MissingTrackReport {
        /// The media type that was looked up.
        media_type: MediaType,
    },

    /// A media segment resolved to a non-positive duration.
    #[error("Segment has no duration: {}", path.display())]
    ZeroDurationSegment {
        /// Segment file path.
        path: PathBuf,
    },

    /// The segment pipeline no longer accepts work.
    #[error("Segment pipeline is closed")]
    PipelineClosed,

    /// Input data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Convenience constructor for [`Error::FileCreationFailed`].
    pub fn file_creation(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::FileCreationFailed {
            path: path.into(),
            source,
        }
    }

    /// Convenience constructor for [`Error::SegmentWriteFailed`].
    pub fn segment_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::SegmentWriteFailed {
            path: path.into(),
            source,
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

//! hr-hls: segment sequencing and progressive HLS playlist writing.
//!
//! # Modules
//!
//! - [`playlist`] - M3U8 line formatting and in-memory playlist rendering
//! - [`manifest`] - Append-only `.m3u8` file with an explicit lifecycle
//! - [`naming`] - Segment file names derived from the session counter
//! - [`sequencer`] - Turns encoder output into segment files, playlist entries and events
//! - [`pipeline`] - Single-consumer queue for multi-threaded producers

pub mod manifest;
pub mod naming;
pub mod pipeline;
pub mod playlist;
pub mod sequencer;

// Re-export commonly used items at the crate root.
pub use manifest::{manifest_path, ManifestState, ManifestWriter};
pub use pipeline::{PipelineSender, PipelineSummary, ProducedSegment, SegmentPipeline};
pub use playlist::{generate_media_playlist, target_duration, MediaPlaylist, PlaylistSegment};
pub use sequencer::{SegmentSequencer, SequencerOptions};

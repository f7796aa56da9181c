//! Media-domain types for segmented recordings.
//!
//! Enums serialize in lowercase (via `serde(rename_all = "lowercase")`) and
//! implement `Display` manually for consistent string representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// MediaType
// ---------------------------------------------------------------------------

/// Media type of a track inside a produced segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Video,
    Audio,
    Text,
    Metadata,
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Audio => write!(f, "audio"),
            Self::Text => write!(f, "text"),
            Self::Metadata => write!(f, "metadata"),
        }
    }
}

// ---------------------------------------------------------------------------
// MediaTime
// ---------------------------------------------------------------------------

/// A rational time value as reported by the muxer (`value / timescale` seconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaTime {
    pub value: i64,
    pub timescale: u32,
}

impl MediaTime {
    pub fn new(value: i64, timescale: u32) -> Self {
        Self { value, timescale }
    }

    /// Convert to seconds. A zero timescale is an invalid time and yields 0.
    pub fn seconds(&self) -> f64 {
        if self.timescale == 0 {
            return 0.0;
        }
        self.value as f64 / f64::from(self.timescale)
    }
}

// ---------------------------------------------------------------------------
// Timing reports
// ---------------------------------------------------------------------------

/// Per-track timing information for one produced segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackReport {
    pub media_type: MediaType,
    pub duration: MediaTime,
}

/// Timing report attached by the muxer to a produced media segment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentReport {
    #[serde(default)]
    pub track_reports: Vec<TrackReport>,
}

impl SegmentReport {
    /// First track report of the given media type.
    pub fn track(&self, media_type: MediaType) -> Option<&TrackReport> {
        self.track_reports
            .iter()
            .find(|t| t.media_type == media_type)
    }

    /// Like [`SegmentReport::track`], but a missing track is an error.
    pub fn require_track(&self, media_type: MediaType) -> Result<&TrackReport> {
        self.track(media_type)
            .ok_or(Error::MissingTrackReport { media_type })
    }
}

// ---------------------------------------------------------------------------
// SegmentKind
// ---------------------------------------------------------------------------

/// Classification of a produced segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    /// Container and codec setup data, referenced via `#EXT-X-MAP`.
    Initialization,
    /// A playable media fragment.
    Media,
}

impl SegmentKind {
    /// File name suffix appended after `<prefix>-<n>`.
    pub fn file_suffix(&self) -> &'static str {
        match self {
            Self::Initialization => "-init.mp4",
            Self::Media => ".m4s",
        }
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initialization => write!(f, "initialization"),
            Self::Media => write!(f, "media"),
        }
    }
}

// ---------------------------------------------------------------------------
// Segment
// ---------------------------------------------------------------------------

/// A persisted segment, as appended to the manifest and announced to
/// subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Position in the session's counter, starting at 0.
    pub order: u64,
    /// Where the segment bytes were written.
    pub file_location: PathBuf,
    /// When the segment's content was captured.
    pub recorded_at: DateTime<Utc>,
    /// Duration in seconds; 0 for the initialization segment.
    pub duration: f64,
    pub kind: SegmentKind,
}

impl Segment {
    /// Last path component of the segment file, as referenced by the playlist.
    pub fn file_name(&self) -> String {
        file_name_of(&self.file_location)
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

// ---------------------------------------------------------------------------
// Mp4Version
// ---------------------------------------------------------------------------

/// Output container flavour requested by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mp4Version {
    /// A single progressive mp4 file; no segments, no manifest.
    Standard,
    /// Fragmented mp4 delivered as HLS segments.
    #[default]
    Fragmented,
}

impl fmt::Display for Mp4Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Fragmented => write!(f, "fragmented"),
        }
    }
}

impl FromStr for Mp4Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "standard" => Ok(Self::Standard),
            "fragmented" => Ok(Self::Fragmented),
            other => Err(Error::Validation(format!(
                "invalid mp4Version: received '{other}'"
            ))),
        }
    }
}

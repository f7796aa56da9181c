//! M3U8 text generation for progressive VOD playlists.
//!
//! The line formats here are shared by [`crate::ManifestWriter`], which
//! appends them to disk one piece at a time, and by
//! [`generate_media_playlist`], which renders a whole playlist in memory.

use hr_core::{Segment, SegmentKind};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// End-of-list marker closing a VOD playlist.
pub const END_LIST: &str = "#EXT-X-ENDLIST\n";

/// Target duration for a configured segment interval.
///
/// Actual segment durations can be milliseconds longer than the preferred
/// interval, so the bound is `floor(interval) + 1`.
pub fn target_duration(segment_interval_secs: f64) -> u64 {
    if !segment_interval_secs.is_finite() || segment_interval_secs <= 0.0 {
        return 1;
    }
    segment_interval_secs.floor() as u64 + 1
}

/// Render the fixed header block.
pub fn render_header(target_duration: u64) -> String {
    let mut out = String::new();

    writeln!(out, "#EXTM3U").unwrap();
    writeln!(out, "#EXT-X-VERSION:6").unwrap();
    writeln!(out, "#EXT-X-TARGETDURATION:{}", target_duration).unwrap();
    writeln!(out, "#EXT-X-MEDIA-SEQUENCE:0").unwrap();
    writeln!(out, "#EXT-X-PLAYLIST-TYPE:VOD").unwrap();
    writeln!(out, "#EXT-X-INDEPENDENT-SEGMENTS").unwrap();

    out
}

/// Render the `#EXT-X-MAP` line for an initialization segment.
pub fn render_map(uri: &str) -> String {
    format!("#EXT-X-MAP:URI=\"{}\"\n", uri)
}

/// Render the `#EXTINF` line and URI for a media segment.
pub fn render_media(duration: f64, uri: &str) -> String {
    format!("#EXTINF:{:.6},\n{}\n", duration, uri)
}

/// Render the playlist entry for one persisted segment.
pub fn render_entry(segment: &Segment) -> String {
    let uri = segment.file_name();
    match segment.kind {
        SegmentKind::Initialization => render_map(&uri),
        SegmentKind::Media => render_media(segment.duration, &uri),
    }
}

/// A single media segment in an in-memory playlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistSegment {
    /// Segment duration in seconds.
    pub duration: f64,
    /// URI for this segment.
    pub uri: String,
}

/// An in-memory snapshot of a progressive VOD playlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaPlaylist {
    /// Maximum segment duration in integer seconds.
    pub target_duration: u64,
    /// Optional URI for the initialization segment (`#EXT-X-MAP`).
    #[serde(default)]
    pub init_segment_uri: Option<String>,
    /// Ordered list of media segments.
    #[serde(default)]
    pub segments: Vec<PlaylistSegment>,
    /// Whether recording has stopped. If true, `#EXT-X-ENDLIST` is emitted.
    #[serde(default)]
    pub ended: bool,
}

/// Generate the M3U8 text for a [`MediaPlaylist`].
///
/// The output is byte-identical to what [`crate::ManifestWriter`] leaves on
/// disk after the same sequence of appends.
pub fn generate_media_playlist(playlist: &MediaPlaylist) -> String {
    let mut out = render_header(playlist.target_duration);

    if let Some(ref init_uri) = playlist.init_segment_uri {
        out.push_str(&render_map(init_uri));
    }

    for segment in &playlist.segments {
        out.push_str(&render_media(segment.duration, &segment.uri));
    }

    if playlist.ended {
        out.push_str(END_LIST);
    }

    out
}

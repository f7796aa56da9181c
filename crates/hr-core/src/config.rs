//! Recorder configuration.
//!
//! [`RecorderConfig`] is deserialized from JSON. Every field defaults
//! sensibly so a completely empty `{}` file is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::media::Mp4Version;
use crate::Error;

/// Settings for one segmented recording session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Directory receiving segment files and the playlist.
    pub output_dir: PathBuf,
    /// Prefix for segment file names; also the playlist base name.
    pub file_name_prefix: String,
    /// Preferred segment length configured on the encoder, in seconds.
    pub segment_interval_secs: f64,
    /// Whether to write an `.m3u8` playlist alongside the segments.
    pub create_manifest: bool,
    pub mp4_version: Mp4Version,
    /// Broadcast channel capacity of the event bus.
    pub event_capacity: usize,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            file_name_prefix: "segment".into(),
            segment_interval_secs: 6.0,
            create_manifest: true,
            mp4_version: Mp4Version::Fragmented,
            event_capacity: 256,
        }
    }
}

impl RecorderConfig {
    /// Deserialize a `RecorderConfig` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Whether this configuration produces a playlist at all.
    pub fn creates_manifest(&self) -> bool {
        self.create_manifest && self.mp4_version == Mp4Version::Fragmented
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.segment_interval_secs.is_nan() || self.segment_interval_secs <= 0.0 {
            warnings.push(format!(
                "segment_interval_secs is {}; expected a positive number of seconds",
                self.segment_interval_secs
            ));
        }

        if self.file_name_prefix.is_empty() {
            warnings.push("file_name_prefix is empty".into());
        } else if self.file_name_prefix.contains(['/', '\\']) {
            warnings.push(format!(
                "file_name_prefix '{}' contains a path separator",
                self.file_name_prefix
            ));
        }

        if self.create_manifest && self.mp4_version == Mp4Version::Standard {
            warnings.push(
                "create_manifest is set but mp4_version is standard; no playlist will be written"
                    .into(),
            );
        }

        if self.event_capacity == 0 {
            warnings.push("event_capacity is 0; using a capacity of 1".into());
        }

        warnings
    }
}

//! Replay a recorded segment event log through a [`SegmentSequencer`].
//!
//! The log is JSON lines, one produced segment per line:
//!
//! ```text
//! {"payload": "raw/0.mp4", "kind": "initialization"}
//! {"payload": "raw/1.m4s", "kind": "media", "report": {"track_reports": [{"media_type": "video", "duration": {"value": 2360, "timescale": 600}}]}}
//! ```
//!
//! Relative payload paths are resolved against the log's directory.

use anyhow::{Context, Result};
use hr_core::{SegmentKind, SegmentReport};
use hr_hls::SegmentSequencer;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One line of the event log.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestRecord {
    pub payload: PathBuf,
    pub kind: SegmentKind,
    #[serde(default)]
    pub report: Option<SegmentReport>,
}

/// Outcome of an ingest run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestSummary {
    /// Records read from the log.
    pub records: u64,
    /// Segments appended to the playlist.
    pub accepted: u64,
    /// Segments skipped (write failure or no frames).
    pub skipped: u64,
    pub manifest: Option<PathBuf>,
}

/// Parse an event log without touching any payload.
pub fn read_event_log(log_path: &Path) -> Result<Vec<IngestRecord>> {
    let content = std::fs::read_to_string(log_path)
        .with_context(|| format!("Failed to read event log: {:?}", log_path))?;

    let mut records = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let record: IngestRecord = serde_json::from_str(line)
            .with_context(|| format!("Invalid event on line {} of {:?}", index + 1, log_path))?;
        records.push(record);
    }

    Ok(records)
}

/// Feed every record of `log_path` to `sequencer`, then finalize it.
///
/// The playlist is finalized even when a record aborts the run, the same
/// way an encoder failure ends a recording.
pub fn ingest_event_log(log_path: &Path, sequencer: &mut SegmentSequencer) -> Result<IngestSummary> {
    let base_dir = log_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let result = read_event_log(log_path).and_then(|records| {
        let mut summary = IngestSummary::default();
        for (index, record) in records.iter().enumerate() {
            let payload_path = base_dir.join(&record.payload);
            let data = std::fs::read(&payload_path)
                .with_context(|| format!("Failed to read segment payload: {:?}", payload_path))?;

            summary.records += 1;
            let segment = sequencer
                .on_segment_produced(&data, record.kind, record.report.as_ref())
                .with_context(|| format!("Event {} ({:?}) was rejected", index + 1, record.payload))?;
            match segment {
                Some(segment) => {
                    tracing::debug!(order = segment.order, "Accepted {}", segment.file_name());
                    summary.accepted += 1;
                }
                None => summary.skipped += 1,
            }
        }
        Ok(summary)
    });

    sequencer
        .finish_writing()
        .context("Failed to finalize manifest")?;

    let mut summary = result?;
    summary.manifest = sequencer.manifest_path().map(Path::to_path_buf);
    Ok(summary)
}

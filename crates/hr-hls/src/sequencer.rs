//! Segment sequencing: turns encoder output into named segment files,
//! playlist entries and `SegmentCreated` events.
//!
//! One [`SegmentSequencer`] exists per recording session. It owns the
//! session's [`ManifestWriter`] and the counter used for both file names and
//! segment order. Every call to [`SegmentSequencer::on_segment_produced`]
//! consumes one counter value, whether or not the segment ends up in the
//! playlist.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use hr_core::config::RecorderConfig;
use hr_core::events::{EventBus, EventPayload};
use hr_core::{Error, MediaType, Result, Segment, SegmentKind, SegmentReport, SessionId};

use crate::manifest::ManifestWriter;
use crate::naming::segment_file_name;
use crate::playlist::target_duration;

/// Construction parameters for a [`SegmentSequencer`].
#[derive(Debug, Clone)]
pub struct SequencerOptions {
    /// Directory receiving segment files and the playlist.
    pub directory: PathBuf,
    /// Prefix for segment file names and playlist base name.
    pub file_name_prefix: String,
    /// Preferred segment interval configured on the encoder, in seconds.
    pub segment_interval_secs: f64,
    pub create_manifest: bool,
}

impl From<&RecorderConfig> for SequencerOptions {
    fn from(config: &RecorderConfig) -> Self {
        Self {
            directory: config.output_dir.clone(),
            file_name_prefix: config.file_name_prefix.clone(),
            segment_interval_secs: config.segment_interval_secs,
            create_manifest: config.creates_manifest(),
        }
    }
}

/// Sequencer for one recording session.
pub struct SegmentSequencer {
    directory: PathBuf,
    prefix: String,
    segment_count: u64,
    accepted: u64,
    manifest: Option<ManifestWriter>,
    manifest_path: Option<PathBuf>,
    events: Option<Arc<EventBus>>,
    session_id: SessionId,
    finished: bool,
}

impl SegmentSequencer {
    /// Start a session: create the playlist (if requested) and write its
    /// header with a target duration of `floor(interval) + 1`.
    pub fn new(options: SequencerOptions, events: Option<Arc<EventBus>>) -> Self {
        let mut manifest = None;
        let mut manifest_path = None;

        if options.create_manifest {
            let mut writer = ManifestWriter::open(&options.directory, &options.file_name_prefix);
            if writer.is_attached() {
                manifest_path = Some(writer.path().to_path_buf());
            }
            let target = target_duration(options.segment_interval_secs);
            if let Err(e) = writer.initialize_header(target) {
                tracing::warn!("Failed to write manifest header: {e}");
            }
            manifest = Some(writer);
        }

        let session_id = SessionId::new();
        tracing::info!(
            %session_id,
            "Recording session started in {}",
            options.directory.display()
        );

        Self {
            directory: options.directory,
            prefix: options.file_name_prefix,
            segment_count: 0,
            accepted: 0,
            manifest,
            manifest_path,
            events,
            session_id,
            finished: false,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Number of counter values consumed so far.
    pub fn segment_count(&self) -> u64 {
        self.segment_count
    }

    /// Number of segments appended to the playlist and announced.
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    /// Path of the playlist, if one was created for this session.
    pub fn manifest_path(&self) -> Option<&Path> {
        self.manifest_path.as_deref()
    }

    /// Handle one segment delivered by the encoder.
    ///
    /// Returns the persisted [`Segment`] when it was appended to the
    /// playlist, or `None` when it was skipped (write failure or a media
    /// segment without frames; both are logged). A media segment without a
    /// video track report is an upstream contract violation and returns
    /// [`Error::MissingTrackReport`].
    pub fn on_segment_produced(
        &mut self,
        data: &[u8],
        kind: SegmentKind,
        report: Option<&SegmentReport>,
    ) -> Result<Option<Segment>> {
        let order = self.segment_count;
        self.segment_count += 1;

        let file_location = self
            .directory
            .join(segment_file_name(&self.prefix, order, kind));

        if let Err(e) = std::fs::write(&file_location, data) {
            return self.skip(Error::segment_write(&file_location, e));
        }
        tracing::debug!("Wrote segment file {}", file_location.display());

        let (duration, recorded_at) = match kind {
            SegmentKind::Initialization => (0.0, modified_at(&file_location)),
            SegmentKind::Media => {
                let track = report
                    .ok_or(Error::MissingTrackReport {
                        media_type: MediaType::Video,
                    })?
                    .require_track(MediaType::Video)?;
                let duration = track.duration.seconds();
                if duration <= 0.0 {
                    return self.skip(Error::ZeroDurationSegment {
                        path: file_location,
                    });
                }
                let written = modified_at(&file_location);
                let started = recording_start(written, duration).unwrap_or_else(|| {
                    tracing::warn!(
                        order,
                        duration,
                        "Segment duration is out of range; using file time as start"
                    );
                    written
                });
                (duration, started)
            }
        };

        let segment = Segment {
            order,
            file_location,
            recorded_at,
            duration,
            kind,
        };

        if let Some(manifest) = self.manifest.as_mut() {
            if let Err(e) = manifest.append_entry(&segment) {
                tracing::warn!(order, "Failed to append manifest entry: {e}");
            }
        }
        self.accepted += 1;

        if let Some(bus) = &self.events {
            bus.broadcast(EventPayload::SegmentCreated {
                session_id: self.session_id,
                segment: segment.clone(),
            });
        }

        Ok(Some(segment))
    }

    /// Finalize the playlist. Must follow the last `on_segment_produced`.
    ///
    /// Only the first call has an effect.
    pub fn finish_writing(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;

        let result = match self.manifest.as_mut() {
            Some(manifest) => manifest.finalize(),
            None => Ok(()),
        };

        tracing::info!(
            session_id = %self.session_id,
            segments = self.accepted,
            "Recording session finished"
        );

        if let Some(bus) = &self.events {
            bus.broadcast(EventPayload::RecordingFinished {
                session_id: self.session_id,
                segments: self.accepted,
                manifest: self.manifest_path.clone(),
            });
        }

        result
    }

    fn skip(&self, err: Error) -> Result<Option<Segment>> {
        match err {
            Error::ZeroDurationSegment { ref path } => {
                tracing::debug!("Skipping segment without video frames: {}", path.display());
            }
            ref other => tracing::warn!("{other}"),
        }
        Ok(None)
    }
}

/// Wall-clock start of a segment that finished writing at `written` after
/// `duration` seconds. `None` when the result leaves chrono's date range.
fn recording_start(written: DateTime<Utc>, duration: f64) -> Option<DateTime<Utc>> {
    // Saturating cast; an oversized delta fails the checked subtraction below.
    let micros = (duration * 1_000_000.0).round() as i64;
    written.checked_sub_signed(chrono::Duration::microseconds(micros))
}

/// Last-modified time of a file, or now if it cannot be read.
fn modified_at(path: &Path) -> DateTime<Utc> {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now())
}

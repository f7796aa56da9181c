//! Single-consumer queue in front of a [`SegmentSequencer`].
//!
//! Hosts whose encoder callbacks fire on arbitrary threads submit segments
//! through a [`PipelineSender`]; one blocking worker drains the queue and
//! drives the sequencer, so file names and playlist order follow enqueue
//! order.

use bytes::Bytes;
use hr_core::{Error, Result, SegmentKind, SegmentReport};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::sequencer::SegmentSequencer;

/// One segment as delivered by the encoder.
#[derive(Debug, Clone)]
pub struct ProducedSegment {
    pub data: Bytes,
    pub kind: SegmentKind,
    pub report: Option<SegmentReport>,
}

impl ProducedSegment {
    pub fn new(data: impl Into<Bytes>, kind: SegmentKind, report: Option<SegmentReport>) -> Self {
        Self {
            data: data.into(),
            kind,
            report,
        }
    }
}

/// Counts reported once the worker has finalized the playlist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    /// Segments taken off the queue.
    pub processed: u64,
    /// Segments appended to the playlist.
    pub accepted: u64,
    /// Segments dropped after a write failure or without frames.
    pub skipped: u64,
    /// Segments rejected as upstream contract violations.
    pub failed: u64,
}

enum Command {
    Segment(ProducedSegment),
    Finish,
}

/// Cloneable submission handle.
#[derive(Clone)]
pub struct PipelineSender {
    tx: mpsc::UnboundedSender<Command>,
}

impl PipelineSender {
    /// Enqueue a segment. Fails with [`Error::PipelineClosed`] once the
    /// worker has stopped.
    pub fn submit(&self, segment: ProducedSegment) -> Result<()> {
        self.tx
            .send(Command::Segment(segment))
            .map_err(|_| Error::PipelineClosed)
    }
}

/// A running sequencer worker.
pub struct SegmentPipeline {
    sender: PipelineSender,
    worker: JoinHandle<PipelineSummary>,
}

impl SegmentPipeline {
    /// Move `sequencer` onto a blocking worker task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(sequencer: SegmentSequencer) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::task::spawn_blocking(move || run_worker(sequencer, rx));
        Self {
            sender: PipelineSender { tx },
            worker,
        }
    }

    pub fn sender(&self) -> PipelineSender {
        self.sender.clone()
    }

    pub fn submit(&self, segment: ProducedSegment) -> Result<()> {
        self.sender.submit(segment)
    }

    /// Finalize after every segment queued so far and wait for the worker.
    pub async fn finish(self) -> Result<PipelineSummary> {
        // The worker may already be gone if every sender was dropped.
        let _ = self.sender.tx.send(Command::Finish);
        self.worker
            .await
            .map_err(|e| Error::Internal(format!("segment pipeline worker failed: {e}")))
    }
}

fn run_worker(
    mut sequencer: SegmentSequencer,
    mut rx: mpsc::UnboundedReceiver<Command>,
) -> PipelineSummary {
    let mut summary = PipelineSummary::default();

    while let Some(command) = rx.blocking_recv() {
        let segment = match command {
            Command::Segment(segment) => segment,
            Command::Finish => break,
        };
        summary.processed += 1;

        match sequencer.on_segment_produced(&segment.data, segment.kind, segment.report.as_ref()) {
            Ok(Some(_)) => summary.accepted += 1,
            Ok(None) => summary.skipped += 1,
            Err(e) => {
                tracing::error!(session_id = %sequencer.session_id(), "Rejected segment: {e}");
                summary.failed += 1;
            }
        }
    }

    rx.close();
    let mut late = 0usize;
    while rx.try_recv().is_ok() {
        late += 1;
    }
    if late > 0 {
        tracing::warn!("Dropped {late} segments submitted after finish");
    }

    if let Err(e) = sequencer.finish_writing() {
        tracing::warn!("Failed to finalize manifest: {e}");
    }

    summary
}

//! Bounded FIFO that hands finished audio to a persistent store.
//!
//! Enqueueing never blocks. One drain task at a time pulls segments in
//! order and waits for each store write before taking the next; a
//! `processing` flag turns a second concurrent drain into a no-op.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use thiserror::Error;

use crate::store::{SegmentStore, StoreError};

/// Default queue capacity, in segments.
pub const DEFAULT_SPOOL_CAPACITY: usize = 64;

/// How long a running worker waits for a segment before rechecking its stop flag.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A finished block of interleaved audio.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub name: String,
    pub sample_rate: u32,
    pub channels: u16,
    /// Interleaved samples, `frames * channels` long
    pub samples: Vec<f32>,
}

impl Segment {
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    /// Length in seconds.
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }
}

#[derive(Debug, Error)]
pub enum SpoolError {
    #[error("spool queue is full ({capacity} segments)")]
    Full { capacity: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpoolConfig {
    /// Maximum number of queued segments
    pub capacity: usize,
}

impl Default for SpoolConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_SPOOL_CAPACITY,
        }
    }
}

/// Outcome of a drain pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub persisted: usize,
    pub failed: usize,
}

impl DrainReport {
    pub fn total(&self) -> usize {
        self.persisted + self.failed
    }

    fn record(&mut self, name: &str, result: Result<(), StoreError>) {
        match result {
            Ok(()) => self.persisted += 1,
            Err(err) => {
                tracing::error!(segment = name, %err, "failed to persist segment");
                self.failed += 1;
            }
        }
    }
}

/// Cloneable handle to the queue. Clones share the same FIFO and guard.
#[derive(Clone)]
pub struct SpoolQueue {
    sender: Sender<Segment>,
    receiver: Receiver<Segment>,
    processing: Arc<AtomicBool>,
    capacity: usize,
}

impl SpoolQueue {
    pub fn new(config: SpoolConfig) -> Self {
        let capacity = config.capacity.max(1);
        let (sender, receiver) = crossbeam_channel::bounded(capacity);
        Self {
            sender,
            receiver,
            processing: Arc::new(AtomicBool::new(false)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Is a drain task currently running?
    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    /// Queue a segment without blocking.
    ///
    /// Every handle owns a receiver, so the channel cannot disconnect and a
    /// rejected send always means the queue is full.
    pub fn enqueue(&self, segment: Segment) -> Result<(), SpoolError> {
        self.sender.try_send(segment).map_err(|_| SpoolError::Full {
            capacity: self.capacity,
        })
    }

    /// Persist every queued segment, in order, then return.
    ///
    /// Returns an empty report without touching the queue if another drain
    /// is already in progress.
    pub fn drain(&self, store: &mut impl SegmentStore) -> DrainReport {
        let mut report = DrainReport::default();
        let Some(_guard) = ProcessingGuard::acquire(&self.processing) else {
            tracing::debug!("spool drain already in progress");
            return report;
        };

        while let Ok(segment) = self.receiver.try_recv() {
            report.record(&segment.name, store.persist(&segment));
        }
        if report.total() > 0 {
            tracing::debug!(persisted = report.persisted, failed = report.failed, "drained spool");
        }
        report
    }

    /// Persist segments as they arrive until `stop` is set.
    ///
    /// Intended to run on its own thread. Segments still queued when `stop`
    /// is observed stay in the queue.
    pub fn run(&self, store: &mut impl SegmentStore, stop: &AtomicBool) -> DrainReport {
        let mut report = DrainReport::default();
        let Some(_guard) = ProcessingGuard::acquire(&self.processing) else {
            tracing::debug!("spool drain already in progress");
            return report;
        };

        while !stop.load(Ordering::Relaxed) {
            if let Ok(segment) = self.receiver.recv_timeout(POLL_INTERVAL) {
                report.record(&segment.name, store.persist(&segment));
            }
        }
        tracing::debug!(persisted = report.persisted, failed = report.failed, "spool worker stopped");
        report
    }
}

/// Holds the `processing` flag for the lifetime of one drain task.
struct ProcessingGuard<'a>(&'a AtomicBool);

impl<'a> ProcessingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

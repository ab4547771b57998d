//! Chunked rolling frame buffer
//!
//! The buffer holds the most recent `max_chunks` closed chunks, oldest first,
//! and evicts the head when a new chunk arrives at capacity. Chunks are
//! immutable once closed and shared as `Arc`s, so snapshots stay valid no
//! matter what the buffer does afterwards.

use crate::capture::Frame;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// A fixed-duration, ordered batch of frames; the buffer's unit of eviction.
#[derive(Debug)]
pub struct Chunk {
    /// When the chunk was opened
    pub started_at: DateTime<Utc>,

    /// Frames in non-decreasing timestamp order
    pub frames: Vec<Frame>,
}

impl Chunk {
    /// Open an empty chunk starting now
    pub fn open() -> Self {
        Self::open_at(Utc::now())
    }

    pub fn open_at(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            frames: Vec::new(),
        }
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the chunk's nominal duration has elapsed at `now`
    pub fn is_due(&self, now: DateTime<Utc>, chunk_duration: Duration) -> bool {
        let elapsed = now.signed_duration_since(self.started_at);
        elapsed >= chrono::Duration::from_std(chunk_duration).unwrap_or(chrono::Duration::MAX)
    }
}

/// Bounded FIFO collection of closed chunks covering a rolling history
/// window.
#[derive(Debug)]
pub struct RingBuffer {
    chunks: VecDeque<Arc<Chunk>>,
    max_chunks: usize,
    chunk_duration: Duration,
}

impl RingBuffer {
    /// `buffer_duration / chunk_duration` chunks of capacity, at least one.
    pub fn new(buffer_duration: Duration, chunk_duration: Duration) -> Self {
        let max_chunks =
            (buffer_duration.as_secs_f64() / chunk_duration.as_secs_f64()).floor() as usize;
        Self {
            chunks: VecDeque::with_capacity(max_chunks.max(1)),
            max_chunks: max_chunks.max(1),
            chunk_duration,
        }
    }

    /// Insert a closed chunk at the tail, evicting the oldest first when at
    /// capacity. Callers never observe the buffer over capacity.
    pub fn append_chunk(&mut self, chunk: Arc<Chunk>) {
        if self.chunks.len() == self.max_chunks {
            if let Some(evicted) = self.chunks.pop_front() {
                tracing::trace!(
                    started_at = %evicted.started_at,
                    frames = evicted.len(),
                    "Evicted oldest chunk"
                );
            }
        }
        self.chunks.push_back(chunk);
    }

    /// The most recent chunks whose cumulative nominal duration covers at
    /// least `duration`, oldest first. Returns everything available when the
    /// buffer holds less history than requested.
    pub fn snapshot_window(&self, duration: Duration) -> Vec<Arc<Chunk>> {
        let needed =
            (duration.as_secs_f64() / self.chunk_duration.as_secs_f64()).ceil() as usize;
        let take = needed.min(self.chunks.len());
        let skip = self.chunks.len() - take;
        self.chunks.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn max_chunks(&self) -> usize {
        self.max_chunks
    }
}

/// Handle to the ring buffer shared between the ingestion path and external
/// readers. The mutex is held only for the structural update or the Arc
/// copy-out, never while encoding or writing video.
#[derive(Debug, Clone)]
pub struct SharedRingBuffer {
    inner: Arc<Mutex<RingBuffer>>,
}

impl SharedRingBuffer {
    pub fn new(buffer_duration: Duration, chunk_duration: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RingBuffer::new(buffer_duration, chunk_duration))),
        }
    }

    pub fn append_chunk(&self, chunk: Arc<Chunk>) {
        self.inner.lock().append_chunk(chunk);
    }

    pub fn snapshot_window(&self, duration: Duration) -> Vec<Arc<Chunk>> {
        self.inner.lock().snapshot_window(duration)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

//! Video persistence
//!
//! The engine hands a finished event to a [`VideoSink`] as an ordered frame
//! sequence plus a filename; container and codec choices live entirely on
//! this side of the seam.

pub mod bundle;

use crate::capture::Frame;
use crate::utils::error::RecorderResult;
use async_trait::async_trait;

pub use bundle::FrameBundleSink;

/// Persists one event's footage. Treated as potentially slow and blocking;
/// the engine never calls it from the ingestion fast path.
#[async_trait]
pub trait VideoSink: Send + Sync {
    /// Write `frames` (already in capture order) under `filename`.
    async fn persist(
        &self,
        frames: Vec<Frame>,
        filename: &str,
        event_type: &str,
    ) -> RecorderResult<()>;

    /// Extension appended to generated filenames
    fn file_extension(&self) -> &'static str;
}

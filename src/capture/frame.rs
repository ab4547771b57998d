//! Captured frame type

use chrono::{DateTime, Utc};
use std::sync::Arc;

/// A single captured image plus its capture timestamp.
///
/// Frames are immutable after creation. The pixel payload is shared behind an
/// `Arc` so the engine can fan a frame out to both the rolling buffer and an
/// active event recording without copying pixels.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raw RGBA pixel data, `width * height * 4` bytes
    pub data: Arc<Vec<u8>>,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Wall-clock capture time
    pub captured_at: DateTime<Utc>,
}

impl Frame {
    /// Create a frame captured now
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self::at(data, width, height, Utc::now())
    }

    /// Create a frame with an explicit capture time
    pub fn at(data: Vec<u8>, width: u32, height: u32, captured_at: DateTime<Utc>) -> Self {
        Self {
            data: Arc::new(data),
            width,
            height,
            captured_at,
        }
    }
}

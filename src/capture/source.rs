//! Frame source trait and task wiring
//!
//! The physical camera driver lives behind [`FrameSource`]; the engine only
//! sees a stream of frames on an mpsc channel. The spawn helper owns the
//! boxed source for the lifetime of its task, so the device handle is
//! released on every exit path, including errors and shutdown.

use super::frame::Frame;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A device that yields timestamped frames at a fixed target rate.
#[async_trait]
pub trait FrameSource: Send {
    /// Wait for and return the next frame.
    ///
    /// `None` means the source is exhausted and the capture task should end.
    /// Transient device errors are the source's problem: retry or reopen
    /// internally, the engine only ever sees "a frame arrived, or none did".
    async fn next_frame(&mut self) -> Option<Frame>;
}

/// Run a frame source in its own task, feeding `tx` until the source is
/// exhausted or the receiver is dropped.
pub fn spawn(mut source: Box<dyn FrameSource>, tx: mpsc::Sender<Frame>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = source.next_frame().await {
            if tx.send(frame).await.is_err() {
                tracing::info!("Frame receiver dropped, stopping capture");
                break;
            }
        }
        tracing::info!("Frame source closed");
    })
}

/// Synthetic frame source producing solid-color RGBA frames at a fixed rate.
///
/// Stands in for the camera driver in demos and tests.
pub struct TestPatternSource {
    width: u32,
    height: u32,
    interval: tokio::time::Interval,
    frame_index: u64,
    remaining: Option<u64>,
}

impl TestPatternSource {
    pub fn new(width: u32, height: u32, frame_interval: Duration) -> Self {
        let mut interval = tokio::time::interval(frame_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        Self {
            width,
            height,
            interval,
            frame_index: 0,
            remaining: None,
        }
    }

    /// Limit the source to `count` frames, then report exhaustion
    pub fn with_frame_limit(mut self, count: u64) -> Self {
        self.remaining = Some(count);
        self
    }

    fn fill_color(&self) -> [u8; 4] {
        // Cycle through a handful of distinguishable colors
        match self.frame_index / 30 % 3 {
            0 => [200, 40, 40, 255],
            1 => [40, 200, 40, 255],
            _ => [40, 40, 200, 255],
        }
    }
}

#[async_trait]
impl FrameSource for TestPatternSource {
    async fn next_frame(&mut self) -> Option<Frame> {
        if let Some(remaining) = &mut self.remaining {
            if *remaining == 0 {
                return None;
            }
            *remaining -= 1;
        }
        self.interval.tick().await;

        let color = self.fill_color();
        let pixel_count = (self.width * self.height) as usize;
        let mut data = Vec::with_capacity(pixel_count * 4);
        for _ in 0..pixel_count {
            data.extend_from_slice(&color);
        }
        self.frame_index += 1;
        Some(Frame::new(data, self.width, self.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pattern_respects_frame_limit() {
        let mut source =
            TestPatternSource::new(4, 4, Duration::from_millis(1)).with_frame_limit(3);
        let mut produced = 0;
        while let Some(frame) = source.next_frame().await {
            assert_eq!(frame.data.len(), 4 * 4 * 4);
            produced += 1;
        }
        assert_eq!(produced, 3);
    }

    #[tokio::test]
    async fn spawn_forwards_frames_in_order() {
        let (tx, mut rx) = mpsc::channel(8);
        let source = TestPatternSource::new(2, 2, Duration::from_millis(1)).with_frame_limit(5);
        let handle = spawn(Box::new(source), tx);

        let mut timestamps = Vec::new();
        while let Some(frame) = rx.recv().await {
            timestamps.push(frame.captured_at);
        }
        handle.await.unwrap();

        assert_eq!(timestamps.len(), 5);
        assert!(timestamps.windows(2).all(|w| w[0] <= w[1]));
    }
}

//! Engine state machine types
//!
//! The engine is either buffering (`Idle`) or capturing one event
//! (`RecordingEvent`). Carrying the in-progress recording inside the variant
//! makes a second simultaneous recording unrepresentable.

use super::buffer::Chunk;
use crate::capture::Frame;
use crate::trigger::{Trigger, TriggerSource};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Current state of the recording engine
#[derive(Debug, Default)]
pub enum EngineState {
    /// Buffering only; triggers are accepted
    #[default]
    Idle,
    /// Capturing the post-event window of one event; triggers are discarded
    RecordingEvent(EventRecording),
}

impl EngineState {
    pub fn is_idle(&self) -> bool {
        matches!(self, EngineState::Idle)
    }
}

/// The transient pre+post window of footage being assembled around one
/// trigger. Owned solely by the engine loop; destroyed once persisted.
#[derive(Debug)]
pub struct EventRecording {
    /// Recording id, used in logs and the sink manifest
    pub id: Uuid,

    /// Which source fired the trigger
    pub source: TriggerSource,

    /// When the trigger fired
    pub triggered_at: DateTime<Utc>,

    /// Closed chunks snapshotted from the ring buffer at trigger time
    pub pre_chunks: Vec<Arc<Chunk>>,

    /// Frames captured between the open chunk's start and the trigger
    pub open_chunk_frames: Vec<Frame>,

    /// Frames accumulated after the trigger
    pub post_frames: Vec<Frame>,
}

impl EventRecording {
    pub fn new(trigger: &Trigger, pre_chunks: Vec<Arc<Chunk>>, open_chunk_frames: Vec<Frame>) -> Self {
        Self {
            id: Uuid::new_v4(),
            source: trigger.source,
            triggered_at: trigger.fired_at,
            pre_chunks,
            open_chunk_frames,
            post_frames: Vec::new(),
        }
    }

    /// Whether the post-event window has elapsed at `now`
    pub fn is_complete(&self, now: DateTime<Utc>, post_event_duration: Duration) -> bool {
        let elapsed = now.signed_duration_since(self.triggered_at);
        elapsed
            >= chrono::Duration::from_std(post_event_duration).unwrap_or(chrono::Duration::MAX)
    }

    /// Flatten pre-trigger chunks, the open chunk's pre-trigger frames, and
    /// post-trigger frames into one capture-ordered sequence.
    pub fn into_frames(self) -> Vec<Frame> {
        let capacity = self
            .pre_chunks
            .iter()
            .map(|c| c.len())
            .sum::<usize>()
            + self.open_chunk_frames.len()
            + self.post_frames.len();
        let mut frames = Vec::with_capacity(capacity);
        for chunk in &self.pre_chunks {
            frames.extend(chunk.frames.iter().cloned());
        }
        frames.extend(self.open_chunk_frames);
        frames.extend(self.post_frames);
        frames
    }

    /// Filename stem for the persisted video: `event_{label}_{timestamp}`
    pub fn filename_stem(&self) -> String {
        format!(
            "event_{}_{}",
            self.source.label(),
            self.triggered_at.format("%Y%m%d_%H%M%S")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn frame_at(at: DateTime<Utc>) -> Frame {
        Frame::at(vec![0; 4], 1, 1, at)
    }

    fn trigger_at(source: TriggerSource, at: DateTime<Utc>) -> Trigger {
        Trigger {
            source,
            fired_at: at,
        }
    }

    #[test]
    fn filename_carries_label_and_timestamp() {
        let at = "2026-08-29T10:15:00Z".parse::<DateTime<Utc>>().unwrap();
        let recording =
            EventRecording::new(&trigger_at(TriggerSource::Bus, at), Vec::new(), Vec::new());
        assert_eq!(recording.filename_stem(), "event_can_20260829_101500");

        let recording =
            EventRecording::new(&trigger_at(TriggerSource::Unknown, at), Vec::new(), Vec::new());
        assert_eq!(recording.filename_stem(), "event_unknown_20260829_101500");
    }

    #[test]
    fn completion_tracks_post_event_window() {
        let at = Utc::now();
        let recording =
            EventRecording::new(&trigger_at(TriggerSource::Console, at), Vec::new(), Vec::new());
        assert!(!recording.is_complete(at + TimeDelta::seconds(4), Duration::from_secs(5)));
        assert!(recording.is_complete(at + TimeDelta::seconds(5), Duration::from_secs(5)));
    }

    #[test]
    fn into_frames_preserves_capture_order_across_the_seam() {
        let base = Utc::now();
        let mut chunk = Chunk::open_at(base);
        chunk.push(frame_at(base));
        chunk.push(frame_at(base + TimeDelta::milliseconds(100)));

        let trigger = trigger_at(TriggerSource::Button, base + TimeDelta::milliseconds(250));
        let open_frames = vec![frame_at(base + TimeDelta::milliseconds(200))];
        let mut recording = EventRecording::new(&trigger, vec![Arc::new(chunk)], open_frames);
        recording.post_frames.push(frame_at(base + TimeDelta::milliseconds(300)));
        recording.post_frames.push(frame_at(base + TimeDelta::milliseconds(400)));

        let frames = recording.into_frames();
        assert_eq!(frames.len(), 5);
        assert!(frames
            .windows(2)
            .all(|w| w[0].captured_at <= w[1].captured_at));
    }

    #[test]
    fn default_state_is_idle() {
        assert!(EngineState::default().is_idle());
    }
}

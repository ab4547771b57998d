//! Recording engine
//!
//! One sequential loop alternating between frame ingestion, trigger polling,
//! and a housekeeping tick. Frames always flow into the rolling buffer; a
//! trigger promotes the engine from `Idle` to `RecordingEvent`, and once the
//! post-event window elapses the assembled footage is handed to the sink on
//! a spawned task so ingestion cadence never depends on persistence latency.

use super::buffer::{Chunk, SharedRingBuffer};
use super::state::{EngineState, EventRecording};
use crate::capture::Frame;
use crate::config::RecorderConfig;
use crate::sink::VideoSink;
use crate::trigger::{Trigger, TriggerReceiver, TriggerSource};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

/// Events emitted by the engine for tests and operator surfaces
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A chunk was closed and appended to the rolling buffer
    ChunkClosed { frames: usize },
    /// A trigger was accepted and an event recording started
    EventStarted {
        source: TriggerSource,
        triggered_at: DateTime<Utc>,
    },
    /// A trigger arrived while an event was already being captured
    TriggerIgnored { source: TriggerSource },
    /// An event video was persisted
    EventSaved { filename: String },
    /// The sink failed; the event's footage is gone
    PersistFailed { filename: String, error: String },
}

/// Durations governing the buffer and the event window
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub chunk_duration: Duration,
    pub buffer_duration: Duration,
    pub pre_event_duration: Duration,
    pub post_event_duration: Duration,
}

impl EngineConfig {
    /// Housekeeping tick period. Fine enough that chunk rolls and the
    /// post-event deadline stay timely even during frame gaps.
    fn poll_interval(&self) -> Duration {
        (self.chunk_duration / 10)
            .clamp(Duration::from_millis(5), Duration::from_millis(250))
    }
}

impl From<&RecorderConfig> for EngineConfig {
    fn from(config: &RecorderConfig) -> Self {
        Self {
            chunk_duration: config.chunk_duration(),
            buffer_duration: config.buffer_duration(),
            pre_event_duration: config.pre_event_duration(),
            post_event_duration: config.post_event_duration(),
        }
    }
}

/// The event-triggered ring-buffer recording engine
pub struct RecordingEngine {
    config: EngineConfig,

    /// Rolling buffer of closed chunks, shared with external readers
    buffer: SharedRingBuffer,

    /// The single currently-open chunk, owned by the ingestion path
    open_chunk: Chunk,

    /// Idle, or capturing one event
    state: EngineState,

    frames: mpsc::Receiver<Frame>,
    triggers: TriggerReceiver,
    triggers_open: bool,

    sink: Arc<dyn VideoSink>,

    /// Event broadcaster
    event_tx: broadcast::Sender<EngineEvent>,
}

impl RecordingEngine {
    pub fn new(
        config: EngineConfig,
        frames: mpsc::Receiver<Frame>,
        triggers: TriggerReceiver,
        sink: Arc<dyn VideoSink>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        let buffer = SharedRingBuffer::new(config.buffer_duration, config.chunk_duration);
        Self {
            config,
            buffer,
            open_chunk: Chunk::open(),
            state: EngineState::Idle,
            frames,
            triggers,
            triggers_open: true,
            sink,
            event_tx,
        }
    }

    /// Handle to the rolling buffer for external readers
    pub fn buffer(&self) -> SharedRingBuffer {
        self.buffer.clone()
    }

    /// Subscribe to engine events
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_tx.subscribe()
    }

    /// Run until the frame channel closes.
    pub async fn run(mut self) {
        tracing::info!(
            chunk_secs = self.config.chunk_duration.as_secs_f64(),
            buffer_secs = self.config.buffer_duration.as_secs_f64(),
            "Recording engine started"
        );

        let mut housekeeping = tokio::time::interval(self.config.poll_interval());
        housekeeping.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                // Frame ingestion takes priority over trigger handling
                biased;

                maybe_frame = self.frames.recv() => match maybe_frame {
                    Some(frame) => self.ingest_frame(frame),
                    None => break,
                },
                maybe_trigger = self.triggers.recv(), if self.triggers_open => {
                    match maybe_trigger {
                        Some(trigger) => self.handle_trigger(trigger),
                        None => self.triggers_open = false,
                    }
                }
                _ = housekeeping.tick() => {}
            }

            let now = Utc::now();
            self.roll_chunk_if_due(now);
            self.finish_event_if_due(now);
        }

        if let EngineState::RecordingEvent(recording) = &self.state {
            tracing::warn!(
                id = %recording.id,
                source = %recording.source,
                "Shutdown during event capture, in-flight recording discarded"
            );
        }
        tracing::info!("Recording engine stopped");
    }

    /// Append a frame to the open chunk and, while an event is active, to
    /// its post-trigger accumulation. Identical in both states apart from
    /// the fan-out.
    fn ingest_frame(&mut self, frame: Frame) {
        if let EngineState::RecordingEvent(recording) = &mut self.state {
            recording.post_frames.push(frame.clone());
        }
        self.open_chunk.push(frame);
    }

    /// Close the open chunk once its duration has elapsed and hand it to the
    /// ring buffer. Boundaries stay fixed-duration and gapless regardless of
    /// trigger activity.
    fn roll_chunk_if_due(&mut self, now: DateTime<Utc>) {
        if !self.open_chunk.is_due(now, self.config.chunk_duration) {
            return;
        }
        if self.open_chunk.is_empty() {
            // Nothing captured this interval; restart the window
            self.open_chunk.started_at = now;
            return;
        }

        let closed = std::mem::replace(&mut self.open_chunk, Chunk::open_at(now));
        let frames = closed.len();
        self.buffer.append_chunk(Arc::new(closed));
        tracing::debug!(frames, "Chunk closed");
        let _ = self.event_tx.send(EngineEvent::ChunkClosed { frames });
    }

    /// Accept the trigger if idle, otherwise discard it. Overlapping events
    /// collapse into the one capture window already in flight.
    fn handle_trigger(&mut self, trigger: Trigger) {
        if !self.state.is_idle() {
            tracing::info!(source = %trigger.source, "Trigger ignored, event capture already active");
            let _ = self.event_tx.send(EngineEvent::TriggerIgnored {
                source: trigger.source,
            });
            return;
        }

        let pre_chunks = self.buffer.snapshot_window(self.config.pre_event_duration);
        // Frames captured since the open chunk started are pre-trigger
        // footage too; without them the pre/post seam would have a gap of up
        // to one chunk_duration.
        let open_chunk_frames = self.open_chunk.frames.clone();

        let recording = EventRecording::new(&trigger, pre_chunks, open_chunk_frames);
        tracing::info!(
            id = %recording.id,
            source = %recording.source,
            pre_chunks = recording.pre_chunks.len(),
            "Event capture started"
        );
        let _ = self.event_tx.send(EngineEvent::EventStarted {
            source: recording.source,
            triggered_at: recording.triggered_at,
        });
        self.state = EngineState::RecordingEvent(recording);
    }

    /// Once the post-event window elapses, hand the assembled footage to the
    /// sink on a spawned task and return to idle immediately.
    fn finish_event_if_due(&mut self, now: DateTime<Utc>) {
        let due = matches!(
            &self.state,
            EngineState::RecordingEvent(recording)
                if recording.is_complete(now, self.config.post_event_duration)
        );
        if !due {
            return;
        }

        let EngineState::RecordingEvent(recording) = std::mem::take(&mut self.state) else {
            return;
        };

        let filename = format!(
            "{}.{}",
            recording.filename_stem(),
            self.sink.file_extension()
        );
        let label = recording.source.label().to_string();
        let sink = Arc::clone(&self.sink);
        let event_tx = self.event_tx.clone();

        tracing::info!(
            id = %recording.id,
            filename = %filename,
            post_frames = recording.post_frames.len(),
            "Event capture complete, persisting"
        );

        tokio::spawn(async move {
            let frames = recording.into_frames();
            match sink.persist(frames, &filename, &label).await {
                Ok(()) => {
                    let _ = event_tx.send(EngineEvent::EventSaved { filename });
                }
                Err(e) => {
                    tracing::error!(filename = %filename, "Failed to persist event video: {e}");
                    let _ = event_tx.send(EngineEvent::PersistFailed {
                        filename,
                        error: e.to_string(),
                    });
                }
            }
        });
    }
}

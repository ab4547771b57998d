//! Event-triggered recording engine
//!
//! - Chunked ring buffer with FIFO eviction
//! - Idle / RecordingEvent state machine
//! - Coordinator loop unifying frames and triggers

pub mod buffer;
pub mod coordinator;
pub mod state;

pub use buffer::{Chunk, RingBuffer, SharedRingBuffer};
pub use coordinator::{EngineConfig, EngineEvent, RecordingEngine};
pub use state::{EngineState, EventRecording};

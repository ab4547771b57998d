//! Recorder configuration
//!
//! Loaded from a JSON file at startup; every key has a default so a missing
//! or partial file still yields a runnable recorder.

use crate::utils::error::{RecorderError, RecorderResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for the recorder process
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecorderConfig {
    /// Duration of one buffer chunk, in seconds
    pub chunk_duration_secs: f64,

    /// Total rolling-buffer history, in seconds
    pub buffer_duration_secs: f64,

    /// History persisted before a trigger, in seconds
    pub pre_event_duration_secs: f64,

    /// Footage captured after a trigger, in seconds
    pub post_event_duration_secs: f64,

    /// Capture width in pixels (enforced by the frame source)
    pub width: u32,

    /// Capture height in pixels (enforced by the frame source)
    pub height: u32,

    /// Target capture rate in frames per second
    pub fps: u32,

    /// Directory event videos are written to
    pub storage_dir: String,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            chunk_duration_secs: 60.0,
            buffer_duration_secs: 600.0,
            pre_event_duration_secs: 300.0,
            post_event_duration_secs: 300.0,
            width: 1280,
            height: 720,
            fps: 30,
            storage_dir: "recordings".to_string(),
        }
    }
}

impl RecorderConfig {
    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> RecorderResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the duration keys make sense together
    pub fn validate(&self) -> RecorderResult<()> {
        if self.chunk_duration_secs <= 0.0 {
            return Err(RecorderError::Config(
                "chunkDurationSecs must be positive".to_string(),
            ));
        }
        if self.buffer_duration_secs < self.chunk_duration_secs {
            return Err(RecorderError::Config(
                "bufferDurationSecs must be at least one chunk long".to_string(),
            ));
        }
        if self.pre_event_duration_secs < 0.0 || self.post_event_duration_secs < 0.0 {
            return Err(RecorderError::Config(
                "event durations must not be negative".to_string(),
            ));
        }
        if self.fps == 0 {
            return Err(RecorderError::Config("fps must be positive".to_string()));
        }
        Ok(())
    }

    pub fn chunk_duration(&self) -> Duration {
        Duration::from_secs_f64(self.chunk_duration_secs)
    }

    pub fn buffer_duration(&self) -> Duration {
        Duration::from_secs_f64(self.buffer_duration_secs)
    }

    pub fn pre_event_duration(&self) -> Duration {
        Duration::from_secs_f64(self.pre_event_duration_secs)
    }

    pub fn post_event_duration(&self) -> Duration {
        Duration::from_secs_f64(self.post_event_duration_secs)
    }

    /// Interval between frames at the target rate
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps as f64)
    }
}

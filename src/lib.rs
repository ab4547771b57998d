//! Blackbox DVR - event-triggered black-box video recorder for test vehicles.
//!
//! Continuously captures camera frames into a bounded rolling buffer and, on
//! a trigger from the vehicle bus, the cabin button, or the operator console,
//! persists a contiguous video spanning a window before and after the trigger
//! instant.

pub mod capture;
pub mod config;
pub mod engine;
pub mod sink;
pub mod trigger;
pub mod utils;

pub use config::RecorderConfig;
pub use engine::{EngineConfig, EngineEvent, RecordingEngine};
pub use utils::error::{RecorderError, RecorderResult};

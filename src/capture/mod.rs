//! Frame capture
//!
//! The `Frame` type plus the `FrameSource` seam the camera driver sits behind.

pub mod frame;
pub mod source;

pub use frame::Frame;
pub use source::{FrameSource, TestPatternSource};

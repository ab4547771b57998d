//! Frame-bundle sink
//!
//! Writes an event as a directory of numbered PNG frames plus a
//! `manifest.json` describing the capture. Downstream tooling (or a plain
//! ffmpeg invocation) turns a bundle into a playable container; keeping the
//! codec out of the recorder keeps persistence failures from ever touching
//! the capture path.

use super::VideoSink;
use crate::capture::Frame;
use crate::utils::error::{RecorderError, RecorderResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Metadata written alongside the frames
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleManifest {
    pub event_type: String,
    pub frame_count: usize,
    pub width: u32,
    pub height: u32,
    pub first_frame_at: Option<chrono::DateTime<chrono::Utc>>,
    pub last_frame_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Sink writing each event into `storage_dir/<filename>/`.
pub struct FrameBundleSink {
    storage_dir: PathBuf,
}

impl FrameBundleSink {
    /// Create the sink, creating `storage_dir` if needed.
    pub fn new(storage_dir: impl Into<PathBuf>) -> RecorderResult<Self> {
        let storage_dir = storage_dir.into();
        std::fs::create_dir_all(&storage_dir)?;
        Ok(Self { storage_dir })
    }

    fn write_png(path: &Path, frame: &Frame) -> RecorderResult<()> {
        let file = std::fs::File::create(path)?;
        let mut encoder = png::Encoder::new(BufWriter::new(file), frame.width, frame.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&frame.data)?;
        Ok(())
    }

    fn write_bundle(
        storage_dir: &Path,
        frames: &[Frame],
        filename: &str,
        event_type: &str,
    ) -> RecorderResult<PathBuf> {
        if frames.is_empty() {
            return Err(RecorderError::Persist(
                "refusing to write an empty event bundle".to_string(),
            ));
        }

        let bundle_dir = storage_dir.join(filename);
        std::fs::create_dir_all(&bundle_dir)?;

        for (index, frame) in frames.iter().enumerate() {
            let frame_path = bundle_dir.join(format!("frame_{index:06}.png"));
            Self::write_png(&frame_path, frame)?;
        }

        let manifest = BundleManifest {
            event_type: event_type.to_string(),
            frame_count: frames.len(),
            width: frames[0].width,
            height: frames[0].height,
            first_frame_at: frames.first().map(|f| f.captured_at),
            last_frame_at: frames.last().map(|f| f.captured_at),
        };
        let manifest_json = serde_json::to_string_pretty(&manifest)?;
        std::fs::write(bundle_dir.join("manifest.json"), manifest_json)?;

        Ok(bundle_dir)
    }
}

#[async_trait]
impl VideoSink for FrameBundleSink {
    async fn persist(
        &self,
        frames: Vec<Frame>,
        filename: &str,
        event_type: &str,
    ) -> RecorderResult<()> {
        let storage_dir = self.storage_dir.clone();
        let filename = filename.to_string();
        let event_type = event_type.to_string();

        // PNG encoding is CPU-bound; keep it off the async workers.
        let bundle_dir = tokio::task::spawn_blocking(move || {
            Self::write_bundle(&storage_dir, &frames, &filename, &event_type)
        })
        .await
        .map_err(|e| RecorderError::Persist(format!("persist task panicked: {e}")))??;

        tracing::info!(path = %bundle_dir.display(), "Saved event bundle");
        Ok(())
    }

    fn file_extension(&self) -> &'static str {
        "frames"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_frame(w: u32, h: u32, value: u8) -> Frame {
        Frame::new(vec![value; (w * h * 4) as usize], w, h)
    }

    #[tokio::test]
    async fn persists_frames_and_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FrameBundleSink::new(dir.path()).unwrap();

        let frames = vec![solid_frame(4, 4, 10), solid_frame(4, 4, 20)];
        sink.persist(frames, "event_can_20260829_101500.frames", "can")
            .await
            .unwrap();

        let bundle = dir.path().join("event_can_20260829_101500.frames");
        assert!(bundle.join("frame_000000.png").exists());
        assert!(bundle.join("frame_000001.png").exists());

        let manifest: BundleManifest =
            serde_json::from_str(&std::fs::read_to_string(bundle.join("manifest.json")).unwrap())
                .unwrap();
        assert_eq!(manifest.event_type, "can");
        assert_eq!(manifest.frame_count, 2);
        assert_eq!(manifest.width, 4);
    }

    #[tokio::test]
    async fn rejects_empty_event() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FrameBundleSink::new(dir.path()).unwrap();
        let result = sink.persist(Vec::new(), "event_unknown_x.frames", "unknown").await;
        assert!(result.is_err());
    }
}

use crate::error::{MediaError, Result};
use crate::judge::{DEFAULT_THRESHOLD, Judge, KeyframePolicy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const IMAGE_QUARANTINE_DIR: &str = "__DUPLICATES";
pub const VIDEO_QUARANTINE_DIR: &str = "__DUPLICATE_VIDEOS";
pub const IMAGE_REPORT_FILE: &str = "moved_images.txt";
pub const VIDEO_REPORT_FILE: &str = "moved_videos.txt";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    pub root: PathBuf,
    /// Maximum Hamming distance (of 64 bits) still counted as a duplicate.
    pub threshold: u32,
    pub keyframe_policy: KeyframePolicy,
    /// Decide and report without touching the filesystem.
    pub dry_run: bool,
    pub image_quarantine_dir: String,
    pub video_quarantine_dir: String,
    pub image_report_file: String,
    pub video_report_file: String,
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            threshold: DEFAULT_THRESHOLD,
            keyframe_policy: KeyframePolicy::default(),
            dry_run: false,
            image_quarantine_dir: IMAGE_QUARANTINE_DIR.to_string(),
            video_quarantine_dir: VIDEO_QUARANTINE_DIR.to_string(),
            image_report_file: IMAGE_REPORT_FILE.to_string(),
            video_report_file: VIDEO_REPORT_FILE.to_string(),
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

impl DedupConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.root.is_dir() {
            return Err(MediaError::InvalidRoot {
                path: self.root.to_string_lossy().to_string(),
            });
        }
        Ok(())
    }

    pub fn judge(&self) -> Judge {
        Judge::new(self.threshold).with_keyframe_policy(self.keyframe_policy)
    }

    pub fn image_quarantine(&self) -> PathBuf {
        self.root.join(&self.image_quarantine_dir)
    }

    pub fn video_quarantine(&self) -> PathBuf {
        self.root.join(&self.video_quarantine_dir)
    }

    pub fn image_report(&self) -> PathBuf {
        self.root.join(&self.image_report_file)
    }

    pub fn video_report(&self) -> PathBuf {
        self.root.join(&self.video_report_file)
    }
}

//! Video decoding through the `ffprobe`/`ffmpeg` command-line tools.
//!
//! Frame counts come from the container metadata, frames are pulled one at
//! a time as PNG over a pipe and decoded with the `image` crate.

use crate::error::{MediaError, Result};
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// A decoded video exposing its frame count and random-access frames.
pub trait VideoSource {
    fn frame_count(&self) -> u64;
    fn frame(&mut self, index: u64) -> Result<DynamicImage>;
}

/// Opens videos. Shared across worker threads while fingerprinting.
pub trait VideoDecoder: Sync {
    type Source: VideoSource;

    fn open(&self, path: &Path) -> Result<Self::Source>;
}

#[derive(Debug, Clone)]
pub struct Ffmpeg {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl Ffmpeg {
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe")
    }
}

impl VideoDecoder for Ffmpeg {
    type Source = FfmpegVideo;

    fn open(&self, path: &Path) -> Result<FfmpegVideo> {
        let output = Command::new(&self.ffprobe)
            .args(build_ffprobe_args(path))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| MediaError::video(path, format!("Failed to execute ffprobe: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MediaError::video(
                path,
                format!("ffprobe exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        let json = String::from_utf8_lossy(&output.stdout);
        let frame_count = parse_frame_count(&json).map_err(|m| MediaError::video(path, m))?;

        Ok(FfmpegVideo {
            ffmpeg: self.ffmpeg.clone(),
            path: path.to_path_buf(),
            frame_count,
        })
    }
}

pub struct FfmpegVideo {
    ffmpeg: PathBuf,
    path: PathBuf,
    frame_count: u64,
}

impl VideoSource for FfmpegVideo {
    fn frame_count(&self) -> u64 {
        self.frame_count
    }

    fn frame(&mut self, index: u64) -> Result<DynamicImage> {
        let output = Command::new(&self.ffmpeg)
            .args(build_frame_args(&self.path, index))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| MediaError::video(&self.path, format!("Failed to execute ffmpeg: {e}")))?;

        if !output.status.success() || output.stdout.is_empty() {
            return Err(MediaError::video(
                &self.path,
                format!("Failed to read frame {index}"),
            ));
        }

        image::load_from_memory(&output.stdout).map_err(|source| MediaError::Decode {
            path: self.path.clone(),
            source,
        })
    }
}

pub fn build_ffprobe_args(path: &Path) -> Vec<String> {
    vec![
        "-v".to_string(),
        "quiet".to_string(),
        "-select_streams".to_string(),
        "v:0".to_string(),
        "-print_format".to_string(),
        "json".to_string(),
        "-show_format".to_string(),
        "-show_streams".to_string(),
        path.to_string_lossy().to_string(),
    ]
}

pub fn build_frame_args(path: &Path, index: u64) -> Vec<String> {
    vec![
        "-v".to_string(),
        "error".to_string(),
        "-i".to_string(),
        path.to_string_lossy().to_string(),
        "-vf".to_string(),
        format!("select=eq(n\\,{index})"),
        "-frames:v".to_string(),
        "1".to_string(),
        "-f".to_string(),
        "image2pipe".to_string(),
        "-vcodec".to_string(),
        "png".to_string(),
        "-".to_string(),
    ]
}

/// Frame count from ffprobe JSON: `nb_frames` when the container records
/// it, otherwise duration × frame rate rounded down.
pub fn parse_frame_count(json: &str) -> std::result::Result<u64, String> {
    let parsed: serde_json::Value =
        serde_json::from_str(json).map_err(|e| format!("Failed to parse ffprobe JSON: {e}"))?;

    let stream = parsed
        .get("streams")
        .and_then(|s| s.as_array())
        .and_then(|streams| {
            streams
                .iter()
                .find(|s| s.get("codec_type").and_then(|t| t.as_str()) == Some("video"))
        })
        .ok_or_else(|| "No video stream found".to_string())?;

    if let Some(n) = stream
        .get("nb_frames")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<u64>().ok())
    {
        return Ok(n);
    }

    let fps = stream
        .get("avg_frame_rate")
        .or_else(|| stream.get("r_frame_rate"))
        .and_then(|v| v.as_str())
        .map(parse_fps_fraction)
        .unwrap_or(0.0);

    let duration = stream
        .get("duration")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<f64>().ok())
        .or_else(|| {
            parsed
                .get("format")
                .and_then(|f| f.get("duration"))
                .and_then(|v| v.as_str())
                .and_then(|s| s.parse::<f64>().ok())
        })
        .unwrap_or(0.0);

    let estimate = duration * fps;
    if estimate.is_finite() && estimate >= 1.0 {
        Ok(estimate.floor() as u64)
    } else {
        Err("Unable to determine frame count".to_string())
    }
}

fn parse_fps_fraction(fraction: &str) -> f64 {
    match fraction.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.parse().unwrap_or(0.0);
            let den: f64 = den.parse().unwrap_or(1.0);
            if den > 0.0 { num / den } else { 0.0 }
        }
        None => fraction.parse().unwrap_or(0.0),
    }
}

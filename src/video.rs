//! Keyframe sampling for video fingerprints.

use crate::decode::VideoSource;
use crate::error::Result;
use crate::fingerprint::{FingerprintExtractor, PerceptualHash};
use serde::{Deserialize, Serialize};

/// Videos shorter than this get a single midpoint keyframe.
pub const SHORT_VIDEO_FRAMES: u64 = 30;

/// Ordered keyframe hashes of one video (1 or 3 entries).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoFingerprint(Vec<PerceptualHash>);

impl VideoFingerprint {
    pub fn new(hashes: Vec<PerceptualHash>) -> Self {
        Self(hashes)
    }

    pub fn hashes(&self) -> &[PerceptualHash] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Frame positions to sample: the midpoint for short videos, otherwise
/// 10%, 50% and 90% of the frame count, rounded down.
pub fn keyframe_indices(frame_count: u64) -> Vec<u64> {
    if frame_count < SHORT_VIDEO_FRAMES {
        vec![frame_count / 2]
    } else {
        vec![frame_count / 10, frame_count / 2, frame_count * 9 / 10]
    }
}

/// Fingerprint every sampled keyframe. A single unreadable frame fails the
/// whole video.
pub fn sample_keyframes<S: VideoSource + ?Sized>(
    source: &mut S,
    extractor: &FingerprintExtractor,
) -> Result<VideoFingerprint> {
    let indices = keyframe_indices(source.frame_count());
    let mut hashes = Vec::with_capacity(indices.len());
    for index in indices {
        let frame = source.frame(index)?;
        hashes.push(extractor.fingerprint(&frame)?);
    }
    Ok(VideoFingerprint(hashes))
}

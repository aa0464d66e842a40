use crate::fingerprint::PerceptualHash;
use crate::video::VideoFingerprint;
use serde::{Deserialize, Serialize};

pub const DEFAULT_THRESHOLD: u32 = 5;

/// How per-keyframe verdicts combine into one video verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum KeyframePolicy {
    /// Every keyframe must be within threshold.
    #[default]
    AllFrames,
    /// More than half of the keyframes must be within threshold.
    Majority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub duplicate: bool,
    pub distance: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Judge {
    pub threshold: u32,
    pub keyframe_policy: KeyframePolicy,
}

impl Judge {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            keyframe_policy: KeyframePolicy::default(),
        }
    }

    pub fn with_keyframe_policy(mut self, policy: KeyframePolicy) -> Self {
        self.keyframe_policy = policy;
        self
    }

    pub fn judge_images(&self, candidate: &PerceptualHash, canonical: &PerceptualHash) -> Verdict {
        let distance = candidate.distance(canonical);
        Verdict {
            duplicate: distance <= self.threshold,
            distance,
        }
    }

    /// `None` when the fingerprints have different keyframe counts; such
    /// videos are never duplicates of each other.
    pub fn judge_videos(
        &self,
        candidate: &VideoFingerprint,
        canonical: &VideoFingerprint,
    ) -> Option<Verdict> {
        if candidate.len() != canonical.len() || candidate.is_empty() {
            return None;
        }

        let distances: Vec<u32> = candidate
            .hashes()
            .iter()
            .zip(canonical.hashes())
            .map(|(a, b)| a.distance(b))
            .collect();
        let within = distances.iter().filter(|&&d| d <= self.threshold).count();

        let duplicate = match self.keyframe_policy {
            KeyframePolicy::AllFrames => within == distances.len(),
            KeyframePolicy::Majority => within * 2 > distances.len(),
        };

        Some(Verdict {
            duplicate,
            distance: distances.into_iter().max().unwrap_or(0),
        })
    }
}

impl Default for Judge {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

/// Fingerprints the deduplicator can compare.
pub trait Fingerprint {
    fn judge(&self, canonical: &Self, judge: &Judge) -> Option<Verdict>;
}

impl Fingerprint for PerceptualHash {
    fn judge(&self, canonical: &Self, judge: &Judge) -> Option<Verdict> {
        Some(judge.judge_images(self, canonical))
    }
}

impl Fingerprint for VideoFingerprint {
    fn judge(&self, canonical: &Self, judge: &Judge) -> Option<Verdict> {
        judge.judge_videos(self, canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(bits: u64) -> PerceptualHash {
        PerceptualHash::from_u64(bits)
    }

    fn video(bits: &[u64]) -> VideoFingerprint {
        VideoFingerprint::new(bits.iter().copied().map(h).collect())
    }

    #[test]
    fn test_image_threshold_is_inclusive() {
        let judge = Judge::new(5);
        assert_eq!(
            judge.judge_images(&h(0b11111), &h(0)),
            Verdict { duplicate: true, distance: 5 }
        );
        assert_eq!(
            judge.judge_images(&h(0b111111), &h(0)),
            Verdict { duplicate: false, distance: 6 }
        );
    }

    #[test]
    fn test_zero_threshold_needs_identical_hash() {
        let judge = Judge::new(0);
        assert!(judge.judge_images(&h(42), &h(42)).duplicate);
        assert!(!judge.judge_images(&h(42), &h(43)).duplicate);
    }

    #[test]
    fn test_monotonic_in_threshold() {
        let pairs = [(0u64, 0b1u64), (0, 0b1011), (0xff, 0xf0f0), (u64::MAX, 0)];
        for (a, b) in pairs {
            for t1 in 0..=64 {
                for t2 in t1..=64 {
                    if Judge::new(t1).judge_images(&h(a), &h(b)).duplicate {
                        assert!(Judge::new(t2).judge_images(&h(a), &h(b)).duplicate);
                    }
                }
            }
        }
    }

    #[test]
    fn test_symmetric_verdict() {
        let judge = Judge::default();
        let a = video(&[1, 2, 3]);
        let b = video(&[0b1111, 2, 0]);
        assert_eq!(judge.judge_videos(&a, &b), judge.judge_videos(&b, &a));
    }

    #[test]
    fn test_unequal_video_lengths_never_match() {
        let judge = Judge::new(64);
        assert_eq!(judge.judge_videos(&video(&[7]), &video(&[7, 7, 7])), None);
        assert_eq!(judge.judge_videos(&video(&[7, 7, 7]), &video(&[7])), None);
    }

    #[test]
    fn test_single_outlier_keyframe_vetoes_match() {
        let judge = Judge::new(5);
        let a = video(&[0, 0, 0]);
        let b = video(&[0, 0, u64::MAX]);
        assert_eq!(
            judge.judge_videos(&a, &b),
            Some(Verdict { duplicate: false, distance: 64 })
        );
    }

    #[test]
    fn test_video_distance_is_worst_keyframe() {
        let judge = Judge::new(5);
        let verdict = judge
            .judge_videos(&video(&[0, 0b11, 0b1]), &video(&[0, 0, 0]))
            .unwrap();
        assert!(verdict.duplicate);
        assert_eq!(verdict.distance, 2);
    }

    #[test]
    fn test_majority_policy_tolerates_one_outlier() {
        let judge = Judge::new(5).with_keyframe_policy(KeyframePolicy::Majority);
        let a = video(&[0, 0, 0]);
        assert!(judge.judge_videos(&a, &video(&[0, 0, u64::MAX])).unwrap().duplicate);
        assert!(!judge.judge_videos(&a, &video(&[0, u64::MAX, u64::MAX])).unwrap().duplicate);
        // one keyframe has no tolerance to spare
        assert!(!judge.judge_videos(&video(&[0]), &video(&[u64::MAX])).unwrap().duplicate);
    }

    #[test]
    fn test_trait_dispatch() {
        let judge = Judge::default();
        assert!(h(1).judge(&h(1), &judge).unwrap().duplicate);
        assert!(video(&[1]).judge(&video(&[1, 1, 1]), &judge).is_none());
    }
}

//! Online first-seen-wins clustering.
//!
//! Each item is compared against the canonical set in insertion order. The
//! first canonical entry judged a duplicate claims the item; an item with no
//! match becomes canonical itself. Results depend on arrival order, which the
//! scanner fixes by sorting paths.

use crate::index::{BruteForceIndex, CanonicalIndex, Match};
use crate::judge::{Fingerprint, Judge};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    Accepted {
        path: PathBuf,
    },
    Duplicate {
        path: PathBuf,
        matched: PathBuf,
        distance: u32,
    },
    Garbage {
        path: PathBuf,
    },
    /// Unreadable, or could not be moved. Garbage that failed to move was
    /// never read, so it stays out of the scanned count.
    Failed {
        path: PathBuf,
        reason: String,
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        garbage: bool,
    },
}

impl Decision {
    pub fn path(&self) -> &Path {
        match self {
            Decision::Accepted { path }
            | Decision::Duplicate { path, .. }
            | Decision::Garbage { path }
            | Decision::Failed { path, .. } => path,
        }
    }

    pub fn failed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Decision::Failed {
            path: path.into(),
            reason: reason.to_string(),
            garbage: false,
        }
    }

    pub fn failed_garbage(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Decision::Failed {
            path: path.into(),
            reason: reason.to_string(),
            garbage: true,
        }
    }
}

pub struct Deduplicator<F, I = BruteForceIndex<F>> {
    judge: Judge,
    index: I,
    _fingerprint: std::marker::PhantomData<F>,
}

impl<F: Fingerprint> Deduplicator<F> {
    pub fn new(judge: Judge) -> Self {
        Self::with_index(judge, BruteForceIndex::new())
    }
}

impl<F, I: CanonicalIndex<F>> Deduplicator<F, I> {
    pub fn with_index(judge: Judge, index: I) -> Self {
        Self {
            judge,
            index,
            _fingerprint: std::marker::PhantomData,
        }
    }

    /// Judge one item and, if it is unique, make it canonical.
    pub fn process(&mut self, path: PathBuf, fingerprint: F) -> Decision {
        match self.index.find_first_match(&fingerprint, &self.judge) {
            Some(Match {
                path: matched,
                distance,
            }) => Decision::Duplicate {
                path,
                matched,
                distance,
            },
            None => {
                self.index.insert(path.clone(), fingerprint);
                Decision::Accepted { path }
            }
        }
    }

    pub fn canonical(&self) -> &I {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::PerceptualHash;
    use crate::video::VideoFingerprint;

    fn h(bits: u64) -> PerceptualHash {
        PerceptualHash::from_u64(bits)
    }

    #[test]
    fn test_match_against_middle_canonical_entry() {
        let mut dedup = Deduplicator::new(Judge::new(5));
        let f1 = h(0);
        let f2 = h(0xffff_0000);
        let f3 = h(0xffff_ffff_0000_0000);
        for (name, fp) in [("f1.jpg", f1), ("f2.jpg", f2), ("f3.jpg", f3)] {
            assert!(matches!(
                dedup.process(PathBuf::from(name), fp),
                Decision::Accepted { .. }
            ));
        }

        let f4 = h(0xffff_0003);
        let decision = dedup.process(PathBuf::from("f4.jpg"), f4);
        assert_eq!(
            decision,
            Decision::Duplicate {
                path: PathBuf::from("f4.jpg"),
                matched: PathBuf::from("f2.jpg"),
                distance: 2,
            }
        );
        assert!(!dedup.canonical().contains_path(Path::new("f4.jpg")));
        assert_eq!(dedup.canonical().len(), 3);
    }

    #[test]
    fn test_identical_items_all_match_first() {
        let mut dedup = Deduplicator::new(Judge::default());
        let a = h(0x0123_4567_89ab_cdef);
        let decisions: Vec<_> = ["1.png", "2.png", "3.png"]
            .iter()
            .map(|name| dedup.process(PathBuf::from(name), a))
            .collect();

        assert_eq!(
            decisions[0],
            Decision::Accepted {
                path: PathBuf::from("1.png")
            }
        );
        for (decision, name) in decisions[1..].iter().zip(["2.png", "3.png"]) {
            assert_eq!(
                *decision,
                Decision::Duplicate {
                    path: PathBuf::from(name),
                    matched: PathBuf::from("1.png"),
                    distance: 0,
                }
            );
        }
        assert_eq!(dedup.canonical().len(), 1);
    }

    #[test]
    fn test_earliest_of_several_matches_claims_item() {
        let mut dedup = Deduplicator::new(Judge::new(5));
        dedup.process(PathBuf::from("a"), h(0b111));
        dedup.process(PathBuf::from("b"), h(0b111_000_000_000));
        // distance 3 to a, 3 to b
        let decision = dedup.process(PathBuf::from("c"), h(0));
        assert!(matches!(decision, Decision::Duplicate { ref matched, .. } if matched == Path::new("a")));
    }

    #[test]
    fn test_order_dependent_chaining() {
        // b is within threshold of both a and c, but a and c are far apart.
        let a = h(0);
        let b = h(0b1111);
        let c = h(0b1111_1111);

        let mut forward = Deduplicator::new(Judge::new(4));
        let forward_decisions: Vec<_> = [("a", a), ("b", b), ("c", c)]
            .into_iter()
            .map(|(n, f)| forward.process(PathBuf::from(n), f))
            .collect();
        assert_eq!(forward.canonical().len(), 2);
        assert!(matches!(forward_decisions[2], Decision::Accepted { .. }));

        let mut reordered = Deduplicator::new(Judge::new(4));
        let reordered_decisions: Vec<_> = [("b", b), ("a", a), ("c", c)]
            .into_iter()
            .map(|(n, f)| reordered.process(PathBuf::from(n), f))
            .collect();
        assert_eq!(reordered.canonical().len(), 1);
        assert!(matches!(reordered_decisions[2], Decision::Duplicate { .. }));
    }

    #[test]
    fn test_video_lengths_partition_canonical_set() {
        let mut dedup = Deduplicator::new(Judge::new(64));
        let short = VideoFingerprint::new(vec![h(1)]);
        let long = VideoFingerprint::new(vec![h(1), h(1), h(1)]);

        assert!(matches!(
            dedup.process(PathBuf::from("short.mp4"), short.clone()),
            Decision::Accepted { .. }
        ));
        assert!(matches!(
            dedup.process(PathBuf::from("long.mp4"), long),
            Decision::Accepted { .. }
        ));
        assert!(matches!(
            dedup.process(PathBuf::from("short2.mp4"), short),
            Decision::Duplicate { .. }
        ));
    }

    #[test]
    fn test_decision_path_and_failed_constructor() {
        let failed = Decision::failed("x.gif", "corrupt header");
        assert_eq!(failed.path(), Path::new("x.gif"));
        assert!(matches!(failed, Decision::Failed { ref reason, .. } if reason == "corrupt header"));
    }
}

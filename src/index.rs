//! Canonical set storage behind a nearest-neighbor lookup seam.

use crate::judge::{Fingerprint, Judge};
use std::path::{Path, PathBuf};

/// The first canonical entry a candidate was judged a duplicate of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub path: PathBuf,
    pub distance: u32,
}

/// Storage for accepted fingerprints.
///
/// Implementations must report the earliest-inserted matching entry so that
/// first-seen-wins holds regardless of how entries are bucketed.
pub trait CanonicalIndex<F> {
    /// Earliest-inserted entry `candidate` is a duplicate of, if any.
    fn find_first_match(&self, candidate: &F, judge: &Judge) -> Option<Match>;
    /// Append an accepted fingerprint.
    fn insert(&mut self, path: PathBuf, fingerprint: F);
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn contains_path(&self, path: &Path) -> bool;
}

/// Linear scan in insertion order. O(n) per lookup.
#[derive(Debug, Clone)]
pub struct BruteForceIndex<F> {
    entries: Vec<(PathBuf, F)>,
}

impl<F> BruteForceIndex<F> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = (&Path, &F)> {
        self.entries.iter().map(|(p, f)| (p.as_path(), f))
    }
}

impl<F> Default for BruteForceIndex<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Fingerprint> CanonicalIndex<F> for BruteForceIndex<F> {
    fn find_first_match(&self, candidate: &F, judge: &Judge) -> Option<Match> {
        self.entries.iter().find_map(|(path, canonical)| {
            let verdict = candidate.judge(canonical, judge)?;
            log::debug!(
                "compared against {} (distance {})",
                path.display(),
                verdict.distance
            );
            verdict.duplicate.then(|| Match {
                path: path.clone(),
                distance: verdict.distance,
            })
        })
    }

    fn insert(&mut self, path: PathBuf, fingerprint: F) {
        self.entries.push((path, fingerprint));
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn contains_path(&self, path: &Path) -> bool {
        self.entries.iter().any(|(p, _)| p == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::PerceptualHash;

    #[test]
    fn test_earliest_match_wins() {
        let mut index = BruteForceIndex::new();
        index.insert(PathBuf::from("a.jpg"), PerceptualHash::from_u64(0b0001));
        index.insert(PathBuf::from("b.jpg"), PerceptualHash::from_u64(0b0000));

        let hit = index
            .find_first_match(&PerceptualHash::from_u64(0), &Judge::new(5))
            .unwrap();
        assert_eq!(hit.path, PathBuf::from("a.jpg"));
        assert_eq!(hit.distance, 1);
    }

    #[test]
    fn test_no_match_on_empty_index() {
        let index: BruteForceIndex<PerceptualHash> = BruteForceIndex::new();
        assert!(index.is_empty());
        assert!(index
            .find_first_match(&PerceptualHash::from_u64(0), &Judge::new(64))
            .is_none());
    }

    #[test]
    fn test_entries_keep_insertion_order() {
        let mut index = BruteForceIndex::new();
        for (i, name) in ["z.png", "a.png", "m.png"].iter().enumerate() {
            index.insert(PathBuf::from(name), PerceptualHash::from_u64(i as u64));
        }
        let order: Vec<_> = index.entries().map(|(p, _)| p.to_path_buf()).collect();
        assert_eq!(
            order,
            vec![
                PathBuf::from("z.png"),
                PathBuf::from("a.png"),
                PathBuf::from("m.png")
            ]
        );
        assert!(index.contains_path(Path::new("a.png")));
        assert_eq!(index.len(), 3);
    }
}

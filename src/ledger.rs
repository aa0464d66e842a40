use crate::dedup::Decision;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Media files fingerprinted or attempted (garbage excluded).
    pub scanned: usize,
    pub accepted: usize,
    pub duplicates: usize,
    pub garbage: usize,
    pub failed: usize,
}

impl Summary {
    /// Scanned files still in the original folder.
    pub fn remaining(&self) -> usize {
        self.scanned - self.duplicates
    }
}

/// One recorded decision and, for moved files, where they went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    #[serde(flatten)]
    pub decision: Decision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<PathBuf>,
}

/// Accumulates decisions for one run. Holds no decision logic.
#[derive(Debug, Default)]
pub struct ResultLedger {
    summary: Summary,
    entries: Vec<LedgerEntry>,
}

impl ResultLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, decision: Decision) {
        self.record_moved(decision, None);
    }

    /// Record a decision together with its quarantine destination.
    pub fn record_moved(&mut self, decision: Decision, destination: Option<PathBuf>) {
        match &decision {
            Decision::Accepted { .. } => {
                self.summary.scanned += 1;
                self.summary.accepted += 1;
            }
            Decision::Duplicate { .. } => {
                self.summary.scanned += 1;
                self.summary.duplicates += 1;
            }
            Decision::Garbage { .. } => self.summary.garbage += 1,
            Decision::Failed { garbage, .. } => {
                if !garbage {
                    self.summary.scanned += 1;
                }
                self.summary.failed += 1;
            }
        }
        self.entries.push(LedgerEntry {
            decision,
            destination,
        });
    }

    pub fn summary(&self) -> Summary {
        self.summary
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Garbage and duplicate entries in decision order.
    pub fn moved(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter().filter(|e| {
            matches!(
                e.decision,
                Decision::Garbage { .. } | Decision::Duplicate { .. }
            )
        })
    }

    pub fn accepted(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.filter(|d| matches!(d, Decision::Accepted { .. }))
    }

    pub fn duplicates(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.filter(|d| matches!(d, Decision::Duplicate { .. }))
    }

    pub fn garbage(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.filter(|d| matches!(d, Decision::Garbage { .. }))
    }

    pub fn failed(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.filter(|d| matches!(d, Decision::Failed { .. }))
    }

    fn filter(&self, pred: fn(&Decision) -> bool) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter().filter(move |e| pred(&e.decision))
    }
}

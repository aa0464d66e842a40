//! Image and video runs over one root folder.
//!
//! Fingerprints are computed in parallel, then judged sequentially in
//! discovery order so the outcome never depends on thread scheduling.

use crate::config::DedupConfig;
use crate::decode::VideoDecoder;
use crate::dedup::{Decision, Deduplicator};
use crate::error::Result;
use crate::fingerprint::FingerprintExtractor;
use crate::garbage::is_garbage_name;
use crate::judge::{Fingerprint, Judge};
use crate::ledger::{LedgerEntry, ResultLedger, Summary};
use crate::report;
use crate::scanner::{self, MediaKind};
use crate::video::sample_keyframes;
use chrono::{DateTime, Utc};
use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub media: MediaKind,
    pub root: PathBuf,
    pub dry_run: bool,
    pub threshold: u32,
    pub summary: Summary,
    pub entries: Vec<LedgerEntry>,
    /// Text report appended to, absent on dry runs.
    pub report_file: Option<PathBuf>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    fn new(
        media: MediaKind,
        config: &DedupConfig,
        ledger: ResultLedger,
        report_file: Option<PathBuf>,
    ) -> Self {
        Self {
            media,
            root: config.root.clone(),
            dry_run: config.dry_run,
            threshold: config.threshold,
            summary: ledger.summary(),
            entries: ledger.entries().to_vec(),
            report_file,
            finished_at: Utc::now(),
        }
    }
}

/// Moves garbage and duplicates into quarantine and records the outcome.
struct Quarantine<'a> {
    dir: &'a Path,
    dry_run: bool,
    ledger: ResultLedger,
}

impl<'a> Quarantine<'a> {
    fn new(dir: &'a Path, dry_run: bool) -> Self {
        Self {
            dir,
            dry_run,
            ledger: ResultLedger::new(),
        }
    }

    fn settle(&mut self, decision: Decision) {
        match decision {
            Decision::Garbage { .. } | Decision::Duplicate { .. } => self.relocate(decision),
            other => self.ledger.record(other),
        }
    }

    fn relocate(&mut self, decision: Decision) {
        if self.dry_run {
            log::info!("[dry-run] would move {}", decision.path().display());
            self.ledger.record(decision);
            return;
        }

        match scanner::quarantine(decision.path(), self.dir) {
            Ok(dest) => {
                match &decision {
                    Decision::Duplicate { path, matched, distance } => log::info!(
                        "Moved duplicate {} (matches {}, distance {})",
                        path.display(),
                        matched.display(),
                        distance
                    ),
                    _ => log::info!("Moved garbage file {}", decision.path().display()),
                }
                self.ledger.record_moved(decision, Some(dest));
            }
            Err(e) => {
                log::warn!("Could not move {}: {}", decision.path().display(), e);
                let failed = match decision {
                    Decision::Garbage { path } => Decision::failed_garbage(path, e),
                    other => Decision::failed(other.path(), e),
                };
                self.ledger.record(failed);
            }
        }
    }
}

/// Judge fingerprint results in order; failures are recorded, never fatal.
fn deduplicate<F: Fingerprint>(
    fingerprints: Vec<(PathBuf, Result<F>)>,
    judge: Judge,
    quarantine: &mut Quarantine<'_>,
) {
    let mut dedup = Deduplicator::new(judge);
    for (path, fingerprint) in fingerprints {
        match fingerprint {
            Ok(fingerprint) => {
                let decision = dedup.process(path, fingerprint);
                quarantine.settle(decision);
            }
            Err(e) => {
                log::warn!("Skipping {}: {}", path.display(), e);
                quarantine.settle(Decision::failed(path, e));
            }
        }
    }
}

/// Run one fingerprinting stage over `items` files and log its throughput.
fn timed_stage<T>(stage: &str, items: usize, work: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let result = work();
    let elapsed = start.elapsed();
    log::info!(
        "{}: {} files in {:.2?} ({:.1} files/s)",
        stage,
        items,
        elapsed,
        items as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );
    result
}

/// Recursively deduplicate the images under `config.root`.
pub fn run_images(config: &DedupConfig, progress: &ProgressBar) -> Result<RunReport> {
    config.validate()?;
    let quarantine_dir = config.image_quarantine();
    if !config.dry_run {
        scanner::ensure_quarantine_dir(&quarantine_dir)?;
    }

    let files = scanner::discover_images(
        &config.root,
        &[quarantine_dir.clone(), config.video_quarantine()],
    );
    let (garbage, candidates): (Vec<PathBuf>, Vec<PathBuf>) =
        files.into_iter().partition(|p| is_garbage_name(p));
    log::info!(
        "Found {} images ({} garbage) under {}",
        candidates.len() + garbage.len(),
        garbage.len(),
        config.root.display()
    );

    let mut quarantine = Quarantine::new(&quarantine_dir, config.dry_run);
    for path in garbage {
        quarantine.settle(Decision::Garbage { path });
    }

    let extractor = FingerprintExtractor::new();
    let count = candidates.len();
    progress.set_length(count as u64);
    let fingerprints = timed_stage("Image fingerprinting", count, || {
        candidates
            .into_par_iter()
            .map(|path| {
                let fingerprint = extractor.fingerprint_file(&path);
                progress.inc(1);
                (path, fingerprint)
            })
            .collect::<Vec<_>>()
    });

    deduplicate(fingerprints, config.judge(), &mut quarantine);
    finish(
        MediaKind::Image,
        config,
        quarantine.ledger,
        config.image_report(),
        report::append_image_report,
    )
}

/// Deduplicate the videos directly inside `config.root`.
pub fn run_videos<D: VideoDecoder>(
    config: &DedupConfig,
    decoder: &D,
    progress: &ProgressBar,
) -> Result<RunReport> {
    config.validate()?;
    let quarantine_dir = config.video_quarantine();
    if !config.dry_run {
        scanner::ensure_quarantine_dir(&quarantine_dir)?;
    }

    let videos = scanner::discover_videos(&config.root);
    log::info!("Found {} videos in {}", videos.len(), config.root.display());

    let extractor = FingerprintExtractor::new();
    let count = videos.len();
    progress.set_length(count as u64);
    let fingerprints = timed_stage("Video keyframe sampling", count, || {
        videos
            .into_par_iter()
            .map(|path| {
                let fingerprint = decoder
                    .open(&path)
                    .and_then(|mut source| sample_keyframes(&mut source, &extractor));
                progress.inc(1);
                (path, fingerprint)
            })
            .collect::<Vec<_>>()
    });

    let mut quarantine = Quarantine::new(&quarantine_dir, config.dry_run);
    deduplicate(fingerprints, config.judge(), &mut quarantine);
    finish(
        MediaKind::Video,
        config,
        quarantine.ledger,
        config.video_report(),
        report::append_video_report,
    )
}

fn finish(
    media: MediaKind,
    config: &DedupConfig,
    ledger: ResultLedger,
    report_path: PathBuf,
    write: impl FnOnce(&Path, &ResultLedger) -> Result<()>,
) -> Result<RunReport> {
    let report_file = if config.dry_run {
        None
    } else {
        write(&report_path, &ledger)?;
        Some(report_path)
    };
    Ok(RunReport::new(media, config, ledger, report_file))
}

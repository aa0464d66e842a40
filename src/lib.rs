//! Perceptual near-duplicate detection for photo and video folders.
//!
//! Images are fingerprinted with a 64-bit DCT perceptual hash, videos with
//! the hashes of up to three keyframes. Each fingerprint is compared against
//! the fingerprints accepted so far; the first close-enough match marks the
//! newcomer as a duplicate and it is moved into a quarantine folder.

pub mod config;
pub mod decode;
pub mod dedup;
pub mod error;
pub mod fingerprint;
pub mod garbage;
pub mod index;
pub mod judge;
pub mod ledger;
pub mod pipeline;
pub mod report;
pub mod scanner;
pub mod video;

pub use config::DedupConfig;
pub use dedup::{Decision, Deduplicator};
pub use error::{MediaError, Result};
pub use fingerprint::{FingerprintExtractor, PerceptualHash};
pub use index::{BruteForceIndex, CanonicalIndex};
pub use judge::{Judge, KeyframePolicy, Verdict};
pub use ledger::{ResultLedger, Summary};
pub use pipeline::{RunReport, run_images, run_videos};
pub use video::VideoFingerprint;

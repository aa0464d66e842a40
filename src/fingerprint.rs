//! Perceptual hashing of decoded images.
//!
//! Every image is normalized to 8-bit RGB before hashing so palette,
//! grayscale and alpha originals produce comparable hashes.

use crate::error::{MediaError, Result};
use image::{DynamicImage, ImageReader};
use image_hasher::{HashAlg, Hasher, HasherConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// 64-bit DCT perceptual hash. Only Hamming distance is defined on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PerceptualHash(u64);

impl PerceptualHash {
    pub const BITS: u32 = u64::BITS;

    pub fn from_u64(bits: u64) -> Self {
        Self(bits)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; 8] = bytes
            .try_into()
            .map_err(|_| MediaError::HashLength { bytes: bytes.len() })?;
        Ok(Self(u64::from_be_bytes(bytes)))
    }

    pub fn bits(&self) -> u64 {
        self.0
    }

    /// Number of differing bit positions, in `0..=BITS`.
    pub fn distance(&self, other: &Self) -> u32 {
        (self.0 ^ other.0).count_ones()
    }
}

impl fmt::Display for PerceptualHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Computes pHash fingerprints: the 8×8 low-frequency DCT block thresholded
/// at its median, so roughly half the bits are set.
pub struct FingerprintExtractor {
    hasher: Hasher,
}

impl FingerprintExtractor {
    pub fn new() -> Self {
        let hasher = HasherConfig::new()
            .hash_size(8, 8)
            .hash_alg(HashAlg::Median)
            .preproc_dct()
            .to_hasher();
        Self { hasher }
    }

    pub fn fingerprint(&self, image: &DynamicImage) -> Result<PerceptualHash> {
        let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
        let hash = self.hasher.hash_image(&rgb);
        PerceptualHash::from_bytes(hash.as_bytes())
    }

    /// Decode `path` (format sniffed from content) and fingerprint it.
    pub fn fingerprint_file(&self, path: &Path) -> Result<PerceptualHash> {
        let image = decode_image(path)?;
        self.fingerprint(&image)
    }
}

impl Default for FingerprintExtractor {
    fn default() -> Self {
        Self::new()
    }
}

pub fn decode_image(path: &Path) -> Result<DynamicImage> {
    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|source| MediaError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    reader.decode().map_err(|source| MediaError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

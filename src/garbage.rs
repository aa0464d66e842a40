use crate::scanner::{MediaKind, media_kind};
use std::path::Path;

/// Thumbnails and browser re-download copies, judged by file name alone.
///
/// Only image files qualify: the lowercase stem must end with `thumb` or
/// contain `(1)`.
pub fn is_garbage_name(path: &Path) -> bool {
    if media_kind(path) != Some(MediaKind::Image) {
        return false;
    }
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return false;
    };
    let stem = stem.to_lowercase();
    stem.ends_with("thumb") || stem.contains("(1)")
}

use crate::error::{MediaError, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "gif", "webp"];
pub const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "mov", "avi", "mkv"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// Classify a path by extension, case-insensitively.
pub fn media_kind(path: &Path) -> Option<MediaKind> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Image)
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Video)
    } else {
        None
    }
}

/// Recursively collect image files under `root`, sorted by path.
/// Directories listed in `skip` are not descended into.
pub fn discover_images(root: &Path, skip: &[PathBuf]) -> Vec<PathBuf> {
    let mut images = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !skip.iter().any(|s| e.path() == s));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };
        if entry.file_type().is_file() && media_kind(entry.path()) == Some(MediaKind::Image) {
            images.push(entry.into_path());
        }
    }

    images.sort();
    images
}

/// Collect video files directly inside `root` (no recursion), sorted by path.
pub fn discover_videos(root: &Path) -> Vec<PathBuf> {
    let mut videos: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                None
            }
        })
        .filter(|e| e.file_type().is_file() && media_kind(e.path()) == Some(MediaKind::Video))
        .map(|e| e.into_path())
        .collect();

    videos.sort();
    videos
}

/// Create the quarantine directory if it does not exist yet.
pub fn ensure_quarantine_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| MediaError::DirectoryCreate {
        path: dir.to_path_buf(),
        source,
    })
}

/// Where `file` would land in `dir` without overwriting anything there:
/// `name.ext`, then `name-1.ext`, `name-2.ext`, …
pub fn quarantine_destination(file: &Path, dir: &Path) -> PathBuf {
    let file_name = file.file_name().unwrap_or_default();
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let stem = file
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned();
    let ext = file
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    (1..)
        .map(|n| dir.join(format!("{stem}-{n}{ext}")))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

/// Move `file` into `dir`, returning the destination.
pub fn quarantine(file: &Path, dir: &Path) -> Result<PathBuf> {
    let dest = quarantine_destination(file, dir);
    match fs::rename(file, &dest) {
        Ok(()) => Ok(dest),
        Err(rename_err) => {
            // rename cannot cross filesystems; fall back to copy + remove
            if fs::copy(file, &dest).is_err() {
                return Err(MediaError::Move {
                    from: file.to_path_buf(),
                    to: dest,
                    source: rename_err,
                });
            }
            match fs::remove_file(file) {
                Ok(()) => Ok(dest),
                Err(source) => {
                    let _ = fs::remove_file(&dest);
                    Err(MediaError::Move {
                        from: file.to_path_buf(),
                        to: dest,
                        source,
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_media_kind_case_insensitive() {
        assert_eq!(media_kind(Path::new("a.JPG")), Some(MediaKind::Image));
        assert_eq!(media_kind(Path::new("a.WebP")), Some(MediaKind::Image));
        assert_eq!(media_kind(Path::new("a.MKV")), Some(MediaKind::Video));
        assert_eq!(media_kind(Path::new("a.tiff")), None);
        assert_eq!(media_kind(Path::new("jpg")), None);
    }

    #[test]
    fn test_discover_images_recursive_sorted_and_skips_quarantine() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("b.png"));
        touch(&root.join("a.jpg"));
        touch(&root.join("nested/deeper/c.GIF"));
        touch(&root.join("notes.txt"));
        touch(&root.join("clip.mp4"));
        touch(&root.join("__DUPLICATES/old.jpg"));

        let found = discover_images(root, &[root.join("__DUPLICATES")]);
        assert_eq!(
            found,
            vec![
                root.join("a.jpg"),
                root.join("b.png"),
                root.join("nested/deeper/c.GIF"),
            ]
        );
    }

    #[test]
    fn test_discover_videos_is_flat() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("b.MOV"));
        touch(&root.join("a.mp4"));
        touch(&root.join("sub/c.mkv"));
        touch(&root.join("__DUPLICATE_VIDEOS/d.avi"));
        touch(&root.join("e.jpg"));

        assert_eq!(
            discover_videos(root),
            vec![root.join("a.mp4"), root.join("b.MOV")]
        );
    }

    #[test]
    fn test_quarantine_moves_and_avoids_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let q = root.join("__DUPLICATES");
        ensure_quarantine_dir(&q).unwrap();
        ensure_quarantine_dir(&q).unwrap();

        touch(&root.join("one/pic.jpg"));
        touch(&root.join("two/pic.jpg"));

        let first = quarantine(&root.join("one/pic.jpg"), &q).unwrap();
        let second = quarantine(&root.join("two/pic.jpg"), &q).unwrap();

        assert_eq!(first, q.join("pic.jpg"));
        assert_eq!(second, q.join("pic-1.jpg"));
        assert!(!root.join("one/pic.jpg").exists());
        assert!(!root.join("two/pic.jpg").exists());
        assert!(second.exists());
    }

    #[test]
    fn test_quarantine_missing_source_is_move_error() {
        let temp_dir = TempDir::new().unwrap();
        let q = temp_dir.path().join("q");
        ensure_quarantine_dir(&q).unwrap();

        let result = quarantine(&temp_dir.path().join("ghost.png"), &q);
        assert!(matches!(result, Err(MediaError::Move { .. })));
    }

    #[test]
    fn test_quarantine_dir_blocked_by_file() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("__DUPLICATES");
        fs::write(&blocker, b"not a dir").unwrap();

        let result = ensure_quarantine_dir(&blocker);
        assert!(matches!(result, Err(MediaError::DirectoryCreate { .. })));
        assert!(result.unwrap_err().is_fatal());
    }
}

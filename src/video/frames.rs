//! Frame directory conventions.
//!
//! Frames are stored one per file as `frame_<index>.jpg` with the index
//! zero-padded to four digits. Listings order `frame_<n>` files by `n`, which
//! matches plain file name order up to `frame_9999` and stays in frame order
//! once the names widen past it.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Result;

/// Prefix shared by every frame image file name
pub const FRAME_PREFIX: &str = "frame_";

/// Extension used for extracted frames
pub const FRAME_EXTENSION: &str = "jpg";

/// File name for the frame at `index`
pub fn frame_file_name(index: usize) -> String {
    format!("{}{:04}.{}", FRAME_PREFIX, index, FRAME_EXTENSION)
}

/// Whether `path` has an image extension the pipeline reads
pub fn is_image_file<P: AsRef<Path>>(path: P) -> bool {
    match path.as_ref().extension().and_then(|ext| ext.to_str()) {
        Some(ext) => matches!(
            ext.to_lowercase().as_str(),
            "jpg" | "jpeg" | "png" | "bmp"
        ),
        None => false,
    }
}

/// Numeric index of a `frame_<n>.<ext>` file, if the name has that shape
pub fn frame_index<P: AsRef<Path>>(path: P) -> Option<u64> {
    let stem = path.as_ref().file_stem()?.to_str()?;
    let digits = stem.strip_prefix(FRAME_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn is_hidden_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// List image files in `directory` in frame order
///
/// `frame_<n>` images come first, ordered by `n`; any other images follow in
/// file name order. Non-image entries, hidden files and subdirectories are
/// skipped. A missing directory yields an empty list; callers decide whether
/// that is an error.
pub fn list_frame_images<P: AsRef<Path>>(directory: P) -> Result<Vec<PathBuf>> {
    let directory = directory.as_ref();

    if !directory.is_dir() {
        debug!("Frame directory {:?} does not exist", directory);
        return Ok(Vec::new());
    }

    let mut frames = Vec::new();
    for entry in std::fs::read_dir(directory)? {
        let path = entry?.path();

        if path.is_file() && !is_hidden_file(&path) && is_image_file(&path) {
            frames.push(path);
        }
    }

    frames.sort_by_cached_key(|path| {
        let index = frame_index(path);
        (index.is_none(), index, path.file_name().map(|name| name.to_os_string()))
    });
    Ok(frames)
}

/// Remove frame images left behind by an earlier run
///
/// Only files named `frame_*` with an image extension are touched. Returns the
/// number of files removed.
pub fn clear_frame_images<P: AsRef<Path>>(directory: P) -> Result<usize> {
    let directory = directory.as_ref();
    let mut removed = 0;

    for path in list_frame_images(directory)? {
        let is_frame = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.starts_with(FRAME_PREFIX))
            .unwrap_or(false);

        if is_frame {
            std::fs::remove_file(&path)?;
            removed += 1;
        }
    }

    if removed > 0 {
        warn!("Removed {} stale frame images from {:?}", removed, directory);
    }
    Ok(removed)
}

/// File name of `path` for log and error messages
pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

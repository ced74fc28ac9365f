//! Final sweep removing leftover artwork.

use std::path::Path;
use walkdir::WalkDir;

/// Extension swept after embedding (the downloader converts thumbnails to JPEG)
const SWEPT_EXTENSION: &str = "jpg";

/// Delete every `.jpg` file (any case) under `root`.
///
/// Returns the number of files removed. A missing or already clean tree is
/// not an error; individual delete failures are logged and skipped.
pub fn delete_image_files(root: &Path) -> usize {
    let mut removed = 0;

    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let is_jpg = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(SWEPT_EXTENSION));
        if !is_jpg {
            continue;
        }

        match std::fs::remove_file(path) {
            Ok(()) => {
                tracing::debug!("Removed artwork {:?}", path);
                removed += 1;
            }
            Err(e) => tracing::warn!("Failed to remove {:?}: {}", path, e),
        }
    }

    removed
}

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use walkdir::WalkDir;

use crate::error::AppError;

/// Recursively collect image files under `folder` whose extension is allowed.
///
/// `cancel` is checked between entries; a cancelled scan returns `Ok(None)`.
pub fn scan_folder(
    folder: &Path,
    allowed_extensions: &HashSet<String>,
    cancel: &AtomicBool,
) -> Result<Option<Vec<PathBuf>>, AppError> {
    log::info!("Starting file discovery in {}", folder.display());
    log::debug!("Configured allowed extensions: {:?}", allowed_extensions);

    if !folder.is_dir() {
        return Err(AppError::NotFound(format!("folder {}", folder.display())));
    }

    let mut found = Vec::new();
    for entry in WalkDir::new(folder)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if cancel.load(Ordering::Relaxed) {
            log::info!("File discovery cancelled after {} images", found.len());
            return Ok(None);
        }

        if entry.file_type().is_file() {
            let path = entry.path();
            log::trace!("Discovered file: {:?}", path);
            if let Some(ext) = path.extension().and_then(|s| s.to_str()) {
                if allowed_extensions.contains(&ext.to_lowercase()) {
                    log::debug!("Found image file: {:?}", path);
                    found.push(path.to_path_buf());
                } else {
                    log::trace!("Skipping file due to unsupported extension: {:?}", path);
                }
            } else {
                log::trace!("Skipping file with no extension: {:?}", path);
            }
        } else {
            log::trace!("Skipping non-file entry: {:?}", entry.path());
        }
    }

    log::info!("File discovery complete, {} images found.", found.len());
    Ok(Some(found))
}

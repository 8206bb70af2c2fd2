use std::path::{Path, PathBuf};

/// Path recorded in the pointer file, if it can be read and is non-empty.
pub fn load_last_file(pointer: &Path) -> Option<PathBuf> {
    match std::fs::read_to_string(pointer) {
        Ok(content) => {
            let path = content.trim();
            if path.is_empty() {
                log::debug!("Last-file pointer {} is empty", pointer.display());
                None
            } else {
                Some(PathBuf::from(path))
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            log::warn!("Could not read last-file pointer {}: {}", pointer.display(), e);
            None
        }
    }
}

/// Remember `path` as the most recently used marker file. Failures are logged only.
pub fn save_last_file(pointer: &Path, path: &Path) {
    if let Err(e) = std::fs::write(pointer, path.to_string_lossy().as_bytes()) {
        log::warn!("Could not update last-file pointer {}: {}", pointer.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let pointer = dir.path().join("last_file.txt");
        assert!(load_last_file(&pointer).is_none());

        let target = dir.path().join("trip.json");
        save_last_file(&pointer, &target);
        assert_eq!(load_last_file(&pointer), Some(target));
    }

    #[test]
    fn test_blank_or_unwritable_pointer_is_harmless() {
        let dir = tempfile::tempdir().unwrap();
        let pointer = dir.path().join("last_file.txt");
        std::fs::write(&pointer, "  \n").unwrap();
        assert!(load_last_file(&pointer).is_none());

        save_last_file(&dir.path().join("no").join("such").join("dir"), Path::new("x.json"));
    }
}

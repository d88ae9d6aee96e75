//! File discovery for finding images in an input directory.
//!
//! Only the top level of the directory is scanned. Tasks come back in
//! directory iteration order, which depends on the platform and filesystem;
//! callers must not rely on it.

use std::path::Path;
use walkdir::WalkDir;

use crate::config::ProcessingConfig;
use crate::error::{IrisError, Result};
use crate::types::ImageTask;

/// Discovers eligible image files in a directory.
pub struct FileDiscovery {
    supported_formats: Vec<String>,
}

impl FileDiscovery {
    /// Create a new file discovery instance.
    pub fn new(config: &ProcessingConfig) -> Self {
        Self {
            supported_formats: config
                .supported_formats
                .iter()
                .map(|f| f.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// Enumerate eligible files directly inside `dir`.
    ///
    /// Unreadable entries are skipped with a warning; an unreadable
    /// directory is an error.
    pub fn discover(&self, dir: &Path) -> Result<Vec<ImageTask>> {
        if !dir.is_dir() {
            return Err(IrisError::Discovery {
                path: dir.to_path_buf(),
                message: "not a directory".to_string(),
            });
        }

        let mut tasks = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(IrisError::Discovery {
                        path: dir.to_path_buf(),
                        message: e.to_string(),
                    });
                }
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry in {:?}: {e}", dir);
                    continue;
                }
            };

            let path = entry.path();
            if !entry.file_type().is_file() || !self.is_supported(path) {
                continue;
            }
            match ImageTask::new(path) {
                Some(task) => tasks.push(task),
                None => tracing::warn!("Skipping {:?}: file has no usable stem", path),
            }
        }

        tracing::debug!("Discovered {} image(s) in {:?}", tasks.len(), dir);
        Ok(tasks)
    }

    /// Check if a file has a supported extension.
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext_lower = ext.to_lowercase();
                self.supported_formats.iter().any(|fmt| *fmt == ext_lower)
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn discovery() -> FileDiscovery {
        FileDiscovery::new(&ProcessingConfig::default())
    }

    #[test]
    fn test_is_supported() {
        let discovery = discovery();

        assert!(discovery.is_supported(Path::new("test.jpg")));
        assert!(discovery.is_supported(Path::new("test.JPG")));
        assert!(discovery.is_supported(Path::new("test.jpeg")));
        assert!(discovery.is_supported(Path::new("test.Png")));
        assert!(!discovery.is_supported(Path::new("test.webp")));
        assert!(!discovery.is_supported(Path::new("test.txt")));
        assert!(!discovery.is_supported(Path::new("jpg")));
    }

    #[test]
    fn test_discover_filters_and_ignores_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.jpg", "b.PNG", "c.jpeg", "notes.txt", "d.webp"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let nested = dir.path().join("nested.jpg");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(nested.join("inner.jpg"), b"x").unwrap();

        let tasks = discovery().discover(dir.path()).unwrap();

        // Directory iteration order is platform-defined, so compare as a set.
        let ids: BTreeSet<_> = tasks.iter().map(|t| t.stable_id.as_str()).collect();
        assert_eq!(ids, BTreeSet::from(["a", "b", "c"]));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_discover_keeps_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(OsStr::from_bytes(b"caf\xe9.jpg")), b"x").unwrap();
        std::fs::write(dir.path().join("ok.jpg"), b"x").unwrap();

        let tasks = discovery().discover(dir.path()).unwrap();

        assert_eq!(tasks.len(), 2);
        let ids: BTreeSet<_> = tasks.iter().map(|t| t.stable_id.as_str()).collect();
        assert_eq!(ids, BTreeSet::from(["caf\u{FFFD}", "ok"]));
    }

    #[test]
    fn test_discover_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discovery().discover(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_discover_missing_directory_errors() {
        let err = discovery()
            .discover(Path::new("/definitely/not/here"))
            .unwrap_err();
        assert!(matches!(err, IrisError::Discovery { .. }));
    }

    #[test]
    fn test_custom_formats_accept_leading_dot() {
        let config = ProcessingConfig {
            supported_formats: vec![".WEBP".to_string()],
            ..ProcessingConfig::default()
        };
        let discovery = FileDiscovery::new(&config);
        assert!(discovery.is_supported(Path::new("x.webp")));
        assert!(!discovery.is_supported(Path::new("x.jpg")));
    }
}

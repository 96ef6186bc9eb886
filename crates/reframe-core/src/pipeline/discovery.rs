//! File discovery for batch conversion of directories.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ConversionConfig;

/// Finds convertible image files under a path.
pub struct FileDiscovery {
    config: ConversionConfig,
    recursive: bool,
}

/// Information about a discovered file.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Full path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl FileDiscovery {
    /// Create a new discovery instance. With `recursive` off, only the
    /// top level of a directory is scanned.
    pub fn new(config: ConversionConfig, recursive: bool) -> Self {
        Self { config, recursive }
    }

    /// Discover all supported image files at a path.
    ///
    /// If path is a file, returns it if supported.
    /// If path is a directory, finds supported files under it, sorted
    /// by path for deterministic ordering.
    pub fn discover(&self, path: &Path) -> Vec<DiscoveredFile> {
        if path.is_file() {
            if self.is_supported(path) {
                if let Ok(meta) = std::fs::metadata(path) {
                    return vec![DiscoveredFile {
                        path: path.to_path_buf(),
                        size: meta.len(),
                    }];
                }
            }
            return vec![];
        }

        let mut walker = WalkDir::new(path).follow_links(true);
        if !self.recursive {
            walker = walker.max_depth(1);
        }

        let mut files = Vec::new();
        for entry in walker.into_iter().filter_map(|e| e.ok()) {
            let entry_path = entry.path();
            if entry_path.is_file() && self.is_supported(entry_path) {
                if let Ok(meta) = entry.metadata() {
                    files.push(DiscoveredFile {
                        path: entry_path.to_path_buf(),
                        size: meta.len(),
                    });
                }
            }
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        files
    }

    /// Check if a file has a supported extension.
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.config
                    .supported_formats
                    .iter()
                    .any(|fmt| fmt.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    /// Get total size of all discovered files.
    pub fn total_size(files: &[DiscoveredFile]) -> u64 {
        files.iter().map(|f| f.size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_is_supported() {
        let discovery = FileDiscovery::new(ConversionConfig::default(), false);

        assert!(discovery.is_supported(Path::new("test.jpg")));
        assert!(discovery.is_supported(Path::new("test.JPG")));
        assert!(discovery.is_supported(Path::new("test.jpeg")));
        assert!(discovery.is_supported(Path::new("test.png")));
        assert!(discovery.is_supported(Path::new("test.webp")));
        assert!(discovery.is_supported(Path::new("test.avif")));
        assert!(!discovery.is_supported(Path::new("test.txt")));
        assert!(!discovery.is_supported(Path::new("test")));
    }

    #[test]
    fn test_top_level_scan_skips_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.png"));
        touch(&dir.path().join("notes.txt"));
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        touch(&dir.path().join("sub").join("b.jpg"));

        let discovery = FileDiscovery::new(ConversionConfig::default(), false);
        let files = discovery.discover(dir.path());

        assert_eq!(files.len(), 1);
        assert!(files[0].path.ends_with("a.png"));
    }

    #[test]
    fn test_recursive_scan_finds_nested_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("z.png"));
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        touch(&dir.path().join("sub").join("a.jpg"));

        let discovery = FileDiscovery::new(ConversionConfig::default(), true);
        let files = discovery.discover(dir.path());

        assert_eq!(files.len(), 2);
        assert!(files[0].path.ends_with("sub/a.jpg"));
        assert!(files[1].path.ends_with("z.png"));
    }

    #[test]
    fn test_single_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("photo.webp");
        touch(&file);

        let discovery = FileDiscovery::new(ConversionConfig::default(), false);
        let files = discovery.discover(&file);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, file);
        assert_eq!(files[0].size, 1);

        let skipped = discovery.discover(&dir.path().join("missing.txt"));
        assert!(skipped.is_empty());
    }

    #[test]
    fn test_total_size() {
        let files = vec![
            DiscoveredFile {
                path: PathBuf::from("a.jpg"),
                size: 100,
            },
            DiscoveredFile {
                path: PathBuf::from("b.jpg"),
                size: 200,
            },
        ];

        assert_eq!(FileDiscovery::total_size(&files), 300);
    }
}

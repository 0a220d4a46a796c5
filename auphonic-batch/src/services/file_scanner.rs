//! Input file discovery
//!
//! Lists files directly inside the input folder with a given extension.
//! Matching is case-sensitive unless [`FileScanner::case_insensitive`] is used.

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// File scanner errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Specified path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Non-recursive input file scanner
#[derive(Debug, Clone, Default)]
pub struct FileScanner {
    ignore_case: bool,
}

impl FileScanner {
    /// Case-sensitive scanner: `wav` does not match `c.WAV`
    pub fn new() -> Self {
        Self { ignore_case: false }
    }

    /// Scanner that treats `wav`, `WAV` and `Wav` alike
    pub fn case_insensitive() -> Self {
        Self { ignore_case: true }
    }

    pub fn ignores_case(&self) -> bool {
        self.ignore_case
    }

    /// Files in `dir` named `*.<extension>`, ordered by file name
    ///
    /// A leading dot on `extension` is ignored. Sub-directories are not
    /// descended into. Unreadable entries such as dangling symlinks are
    /// logged and skipped. An empty result is not an error.
    pub fn find_files(&self, dir: &Path, extension: &str) -> Result<Vec<PathBuf>, ScanError> {
        if !dir.exists() {
            return Err(ScanError::PathNotFound(dir.to_path_buf()));
        }

        if !dir.is_dir() {
            return Err(ScanError::NotADirectory(dir.to_path_buf()));
        }

        let wanted = extension.trim_start_matches('.');
        let mut files = Vec::new();

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && self.has_extension(entry.path(), wanted) {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), "Skipping unreadable entry: {}", e);
                }
            }
        }

        tracing::debug!(
            dir = %dir.display(),
            extension = wanted,
            count = files.len(),
            "Input files discovered"
        );

        Ok(files)
    }

    fn has_extension(&self, path: &Path, wanted: &str) -> bool {
        match path.extension() {
            Some(ext) => {
                let ext = ext.to_string_lossy();
                if self.ignore_case {
                    ext.eq_ignore_ascii_case(wanted)
                } else {
                    ext == wanted
                }
            }
            None => false,
        }
    }
}

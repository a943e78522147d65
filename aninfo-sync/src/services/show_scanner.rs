//! Show directory discovery
//!
//! Walks the library tree and reports every directory holding a `tvshow.nfo`
//! together with its episode `.nfo` files. Episode files are ordered by file
//! name (byte-wise lexicographic); that order assigns episode positions, so
//! `ep10.nfo` sorts before `ep2.nfo`.

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Show-level metadata file name
pub const SHOW_FILE_NAME: &str = "tvshow.nfo";

/// Extension shared by show and episode metadata files
pub const NFO_EXTENSION: &str = ".nfo";

/// Scanner errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Specified path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Directory listing failed
    #[error("Cannot read directory {0}: {1}")]
    ReadDir(PathBuf, String),
}

/// A directory containing a show-level metadata file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowDirectory {
    pub path: PathBuf,
    /// `<path>/tvshow.nfo`
    pub show_file: PathBuf,
    /// Sibling episode metadata files in position order
    pub episode_files: Vec<PathBuf>,
}

/// Show directory scanner
#[derive(Debug, Clone)]
pub struct ShowScanner {
    ignore_patterns: Vec<String>,
}

impl ShowScanner {
    /// Create scanner with default ignore patterns
    ///
    /// Skips version control and trash directories.
    pub fn new() -> Self {
        Self {
            ignore_patterns: vec![
                ".git".to_string(),
                ".svn".to_string(),
                ".Trash".to_string(),
                "@eaDir".to_string(),
            ],
        }
    }

    /// Fail unless `root` is an existing directory
    pub fn check_root(&self, root: &Path) -> Result<(), ScanError> {
        if !root.exists() {
            return Err(ScanError::PathNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }
        Ok(())
    }

    /// Find every show directory under `root`, in walk order
    ///
    /// Entries that cannot be read below the root are logged and skipped.
    pub fn discover(&self, root: &Path) -> Result<Vec<ShowDirectory>, ScanError> {
        self.check_root(root)?;

        let mut shows = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !self.is_ignored(e.file_name().to_string_lossy().as_ref()));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_dir() {
                continue;
            }

            let show_file = entry.path().join(SHOW_FILE_NAME);
            if !show_file.is_file() {
                continue;
            }

            match self.episode_files(entry.path()) {
                Ok(episode_files) => shows.push(ShowDirectory {
                    path: entry.path().to_path_buf(),
                    show_file,
                    episode_files,
                }),
                Err(e) => tracing::warn!("Skipping show directory: {}", e),
            }
        }

        tracing::debug!(root = %root.display(), shows = shows.len(), "Show discovery complete");
        Ok(shows)
    }

    /// Episode metadata files directly inside `dir`, sorted by file name
    pub fn episode_files(&self, dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| ScanError::ReadDir(dir.to_path_buf(), e.to_string()))?;

        let mut names: Vec<String> = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), "Error reading entry: {}", e);
                    continue;
                }
            };

            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            if is_episode_file_name(&name) {
                names.push(name);
            }
        }

        names.sort();
        Ok(names.into_iter().map(|name| dir.join(name)).collect())
    }

    fn is_ignored(&self, file_name: &str) -> bool {
        self.ignore_patterns.iter().any(|p| file_name == p)
    }
}

impl Default for ShowScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Episode metadata: `.nfo` suffix (case-sensitive), not the show file
pub fn is_episode_file_name(name: &str) -> bool {
    name.ends_with(NFO_EXTENSION) && name != SHOW_FILE_NAME
}

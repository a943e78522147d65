//! Processed-file ledger
//!
//! Append-only record of metadata files that have been reconciled. The
//! persisted log is read once when the ledger is opened; afterwards the
//! in-memory set is authoritative for the running process and every new entry
//! is appended to the backend.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, info};

/// Ledger persistence errors
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Ledger I/O error {0}: {1}")]
    Io(PathBuf, String),
}

/// Storage behind the processed set
pub trait LedgerBackend: Send {
    /// Every persisted entry, in append order
    fn load_all(&self) -> Result<Vec<String>, LedgerError>;

    /// Persist one more entry
    fn append(&mut self, entry: &str) -> Result<(), LedgerError>;
}

/// Plain text ledger: one path per line, append-only
#[derive(Debug, Clone)]
pub struct FileLedgerBackend {
    path: PathBuf,
}

impl FileLedgerBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerBackend for FileLedgerBackend {
    fn load_all(&self) -> Result<Vec<String>, LedgerError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No ledger file yet, starting empty");
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| LedgerError::Io(self.path.clone(), e.to_string()))?;

        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn append(&mut self, entry: &str) -> Result<(), LedgerError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| LedgerError::Io(self.path.clone(), e.to_string()))?;

        writeln!(file, "{}", entry).map_err(|e| LedgerError::Io(self.path.clone(), e.to_string()))
    }
}

/// In-memory backend; clones share the same entries
#[derive(Debug, Clone, Default)]
pub struct MemoryLedgerBackend {
    entries: Arc<Mutex<Vec<String>>>,
}

impl MemoryLedgerBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: Arc::new(Mutex::new(entries.into_iter().map(Into::into).collect())),
        }
    }

    /// Snapshot of everything appended so far
    pub fn entries(&self) -> Vec<String> {
        match self.entries.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl LedgerBackend for MemoryLedgerBackend {
    fn load_all(&self) -> Result<Vec<String>, LedgerError> {
        Ok(self.entries())
    }

    fn append(&mut self, entry: &str) -> Result<(), LedgerError> {
        match self.entries.lock() {
            Ok(mut guard) => guard.push(entry.to_string()),
            Err(poisoned) => poisoned.into_inner().push(entry.to_string()),
        }
        Ok(())
    }
}

/// Ledger key for a path
pub fn ledger_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Set of processed metadata files backed by a persistent log
pub struct ProcessedLedger {
    processed: HashSet<String>,
    backend: Box<dyn LedgerBackend>,
}

impl ProcessedLedger {
    /// Load the persisted entries once and take ownership of the backend
    pub fn open(backend: impl LedgerBackend + 'static) -> Result<Self, LedgerError> {
        let processed: HashSet<String> = backend.load_all()?.into_iter().collect();
        info!(entries = processed.len(), "Loaded processed-file ledger");

        Ok(Self {
            processed,
            backend: Box::new(backend),
        })
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.processed.contains(&ledger_key(path))
    }

    /// Record `path` as processed
    ///
    /// The in-memory set is updated even when the append fails, so the current
    /// process never reconciles the path twice. Already recorded paths are not
    /// appended again.
    pub fn mark_processed(&mut self, path: &Path) -> Result<(), LedgerError> {
        let key = ledger_key(path);
        if !self.processed.insert(key.clone()) {
            return Ok(());
        }

        self.backend.append(&key)?;
        info!("Processed file saved: {}", key);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.processed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_backend_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let backend = FileLedgerBackend::new(temp_dir.path().join("processed_files.log"));
        assert!(backend.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_file_backend_trims_lines_and_skips_blanks() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("processed_files.log");
        std::fs::write(&path, "  /a/tvshow.nfo \n\n/a/ep1.nfo\r\n   \n").unwrap();

        let entries = FileLedgerBackend::new(&path).load_all().unwrap();
        assert_eq!(entries, vec!["/a/tvshow.nfo", "/a/ep1.nfo"]);
    }

    #[test]
    fn test_mark_processed_appends_once_and_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("processed_files.log");

        let mut ledger = ProcessedLedger::open(FileLedgerBackend::new(&path)).unwrap();
        assert!(ledger.is_empty());

        let episode = Path::new("/anime/show/ep1.nfo");
        ledger.mark_processed(episode).unwrap();
        ledger.mark_processed(episode).unwrap();
        assert!(ledger.contains(episode));
        assert_eq!(ledger.len(), 1);

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "/anime/show/ep1.nfo\n"
        );

        let reopened = ProcessedLedger::open(FileLedgerBackend::new(&path)).unwrap();
        assert!(reopened.contains(episode));
        assert!(!reopened.contains(Path::new("/anime/show/ep2.nfo")));
    }

    #[test]
    fn test_memory_backend_shares_entries_between_clones() {
        let backend = MemoryLedgerBackend::with_entries(["/seed.nfo"]);
        let mut ledger = ProcessedLedger::open(backend.clone()).unwrap();

        assert!(ledger.contains(Path::new("/seed.nfo")));
        ledger.mark_processed(Path::new("/new.nfo")).unwrap();

        assert_eq!(backend.entries(), vec!["/seed.nfo", "/new.nfo"]);
    }
}

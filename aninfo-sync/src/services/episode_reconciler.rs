//! Per-episode metadata reconciliation
//!
//! Applies a resolved title (or a filename-derived fallback) and the
//! position-derived episode number to one episode `.nfo` file. Failures are
//! reported as [`ReconcileOutcome::Skipped`] and never abort the scan.

use crate::models::TitleMapping;
use crate::services::nfo_store::{NfoError, NfoStore};
use std::path::Path;
use tracing::{debug, error, info};

/// Where the written title came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleSource {
    Catalog,
    Filename,
}

/// Why a file was left untouched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotFound,
    Malformed(String),
    ReadFailed(String),
    WriteFailed(String),
}

impl From<NfoError> for SkipReason {
    fn from(err: NfoError) -> Self {
        match err {
            NfoError::NotFound(_) => SkipReason::NotFound,
            NfoError::Parse(msg) => SkipReason::Malformed(msg),
            NfoError::Io(_, msg) => SkipReason::ReadFailed(msg),
            NfoError::Write(msg) => SkipReason::WriteFailed(msg),
        }
    }
}

/// Result of reconciling one episode file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// File was rewritten
    Updated {
        title: String,
        title_source: TitleSource,
        episode_changed: bool,
    },
    /// File already held the computed values; no write
    Unchanged,
    /// File could not be read, parsed or written
    Skipped(SkipReason),
}

/// Title used when the mapping has nothing for a position:
/// file stem with underscores turned into spaces
pub fn fallback_title(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().replace('_', " "))
        .unwrap_or_default()
}

/// Writes titles and episode numbers into episode metadata files
#[derive(Debug, Clone, Default)]
pub struct EpisodeReconciler {
    store: NfoStore,
}

impl EpisodeReconciler {
    pub fn new(store: NfoStore) -> Self {
        Self { store }
    }

    /// Reconcile the file at `path`, which sits at 0-based `position` among its siblings
    pub fn reconcile(
        &self,
        path: &Path,
        titles: &TitleMapping,
        position: usize,
    ) -> ReconcileOutcome {
        let mut record = match self.store.load(path) {
            Ok(record) => record,
            Err(e) => {
                error!(path = %path.display(), "Error processing file: {}", e);
                return ReconcileOutcome::Skipped(e.into());
            }
        };

        let episode_number = position + 1;

        let (title, title_source) = match titles.get(position) {
            Some(title) => {
                info!(path = %path.display(), "Updating title to '{}'", title);
                (title.to_string(), TitleSource::Catalog)
            }
            None => {
                let fallback = fallback_title(path);
                info!(
                    path = %path.display(),
                    "No title found for episode {}, using filename '{}'",
                    episode_number,
                    fallback
                );
                (fallback, TitleSource::Filename)
            }
        };
        record.set_title(title.clone());

        let episode = episode_number.to_string();
        let episode_changed = record.episode() != Some(episode.as_str());
        if episode_changed {
            info!(
                path = %path.display(),
                "Updating episode from '{}' to '{}'",
                record.episode().unwrap_or("<none>"),
                episode
            );
            record.set_episode(episode);
        }

        let rendered = match self.store.render(&record) {
            Ok(rendered) => rendered,
            Err(e) => {
                error!(path = %path.display(), "Error rendering file: {}", e);
                return ReconcileOutcome::Skipped(e.into());
            }
        };

        if rendered == record.source() {
            debug!(path = %path.display(), "Metadata already up to date");
            return ReconcileOutcome::Unchanged;
        }

        if let Err(e) = self.store.save_rendered(path, &rendered) {
            error!(path = %path.display(), "Error writing file: {}", e);
            return ReconcileOutcome::Skipped(e.into());
        }

        info!(path = %path.display(), "Processed successfully");
        ReconcileOutcome::Updated {
            title,
            title_source,
            episode_changed,
        }
    }
}

//! Directory scan loop
//!
//! Drives the reconciliation pipeline: discover show directories, resolve
//! episode titles, reconcile each episode file in position order and record
//! every handled file in the processed ledger. One cycle is a full walk of the
//! library; `run_forever` repeats cycles on a fixed interval.

use crate::models::TitleMapping;
use crate::services::episode_reconciler::{EpisodeReconciler, ReconcileOutcome};
use crate::services::nfo_store::NfoStore;
use crate::services::processed_ledger::ProcessedLedger;
use crate::services::show_scanner::{ScanError, ShowDirectory, ShowScanner};
use crate::services::title_resolver::TitleResolver;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Counters for one scan cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Show directories found by the walk
    pub shows_found: usize,
    /// Shows reconciled during this cycle
    pub shows_processed: usize,
    /// Shows skipped because their `tvshow.nfo` is already in the ledger
    pub shows_already_processed: usize,
    pub episodes_updated: usize,
    pub episodes_unchanged: usize,
    pub episodes_skipped: usize,
    /// Episodes left alone because they are already in the ledger
    pub episodes_already_processed: usize,
    /// Ledger appends that failed (the in-memory set was still updated)
    pub ledger_errors: usize,
}

/// Sequential single-worker scan loop
pub struct ScanLoop {
    root: PathBuf,
    scan_interval: Duration,
    scanner: ShowScanner,
    store: NfoStore,
    resolver: TitleResolver,
    reconciler: EpisodeReconciler,
    ledger: ProcessedLedger,
}

impl ScanLoop {
    pub fn new(
        root: impl Into<PathBuf>,
        scan_interval: Duration,
        resolver: TitleResolver,
        ledger: ProcessedLedger,
    ) -> Self {
        let store = NfoStore::new();
        Self {
            root: root.into(),
            scan_interval,
            scanner: ShowScanner::new(),
            store,
            resolver,
            reconciler: EpisodeReconciler::new(store),
            ledger,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ledger(&self) -> &ProcessedLedger {
        &self.ledger
    }

    /// Run one full scan of the library
    pub async fn run_cycle(&mut self) -> Result<CycleReport, ScanError> {
        let shows = self.scanner.discover(&self.root)?;

        let mut report = CycleReport {
            shows_found: shows.len(),
            ..CycleReport::default()
        };

        for show in &shows {
            if self.ledger.contains(&show.show_file) {
                report.shows_already_processed += 1;
                continue;
            }
            self.process_show(show, &mut report).await;
        }

        Ok(report)
    }

    async fn process_show(&mut self, show: &ShowDirectory, report: &mut CycleReport) {
        info!(show = %show.path.display(), episodes = show.episode_files.len(), "Processing show directory");

        let titles = match self.store.load(&show.show_file) {
            Ok(record) => self.resolver.resolve(&record).await,
            Err(e) => {
                error!(path = %show.show_file.display(), "Error reading show metadata: {}", e);
                TitleMapping::new()
            }
        };

        for (position, episode_file) in show.episode_files.iter().enumerate() {
            // Position still counts; a show interrupted mid-run keeps its numbering
            if self.ledger.contains(episode_file) {
                info!(path = %episode_file.display(), "Episode already processed, skipping");
                report.episodes_already_processed += 1;
                continue;
            }

            info!(
                "Starting to check episode {} for file: {}",
                position + 1,
                episode_file.display()
            );

            match self.reconciler.reconcile(episode_file, &titles, position) {
                ReconcileOutcome::Updated { .. } => report.episodes_updated += 1,
                ReconcileOutcome::Unchanged => report.episodes_unchanged += 1,
                ReconcileOutcome::Skipped(reason) => {
                    debug!(path = %episode_file.display(), ?reason, "Episode skipped");
                    report.episodes_skipped += 1;
                }
            }

            // Recorded regardless of outcome; a skipped file is not retried
            self.record_processed(episode_file, report);
        }

        self.record_processed(&show.show_file, report);
        report.shows_processed += 1;
        info!("Processed directory: {}", show.path.display());
    }

    fn record_processed(&mut self, path: &Path, report: &mut CycleReport) {
        if let Err(e) = self.ledger.mark_processed(path) {
            warn!(path = %path.display(), "Failed to persist processed entry: {}", e);
            report.ledger_errors += 1;
        }
    }

    /// Scan forever, sleeping `scan_interval` between cycles
    ///
    /// Returns only if the root is unusable at startup. A failed cycle is logged
    /// and retried after the next sleep.
    pub async fn run_forever(&mut self) -> Result<(), ScanError> {
        self.scanner.check_root(&self.root)?;
        info!(
            root = %self.root.display(),
            interval = ?self.scan_interval,
            "Starting directory monitoring"
        );

        loop {
            match self.run_cycle().await {
                Ok(report) => {
                    if report.shows_processed > 0 {
                        info!(?report, "Scan cycle complete");
                    } else {
                        debug!(?report, "Scan cycle complete, nothing new");
                    }
                }
                Err(e) => error!("Scan cycle failed: {}", e),
            }

            tokio::time::sleep(self.scan_interval).await;
        }
    }
}

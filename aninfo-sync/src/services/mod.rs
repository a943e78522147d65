//! Service modules for the metadata reconciliation pipeline
//!
//! Leaves first:
//! - `nfo_store`: metadata record load/save
//! - `anilist_client`, `jikan_client`: external catalog clients
//! - `title_resolver`: two-stage episode title lookup
//! - `episode_reconciler`: per-episode title/number merge
//! - `processed_ledger`: processed-file gatekeeping
//! - `show_scanner`: show directory discovery and episode ordering

pub mod anilist_client;
pub mod episode_reconciler;
pub mod jikan_client;
pub mod nfo_store;
pub mod processed_ledger;
pub mod show_scanner;
pub mod title_resolver;

pub use anilist_client::AniListClient;
pub use episode_reconciler::{
    fallback_title, EpisodeReconciler, ReconcileOutcome, SkipReason, TitleSource,
};
pub use jikan_client::JikanClient;
pub use nfo_store::{NfoError, NfoStore};
pub use processed_ledger::{
    FileLedgerBackend, LedgerBackend, LedgerError, MemoryLedgerBackend, ProcessedLedger,
};
pub use show_scanner::{ScanError, ShowDirectory, ShowScanner, SHOW_FILE_NAME};
pub use title_resolver::{IdSource, TitleResolver};

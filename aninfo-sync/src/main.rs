//! aninfo-sync - anime library metadata reconciliation service
//!
//! Watches a library root for show directories (`tvshow.nfo`), resolves
//! episode titles through AniList and Jikan, and rewrites the title and
//! episode number of every episode `.nfo` file exactly once.

use anyhow::{Context, Result};
use aninfo_common::config::resolve_config;
use aninfo_common::logging::{bootstrap_subscriber, init_tracing};
use aninfo_sync::services::{
    AniListClient, FileLedgerBackend, JikanClient, ProcessedLedger, TitleResolver,
};
use aninfo_sync::ScanLoop;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Step 1: Resolve configuration (env > TOML > defaults), logging to stderr at info
    let config = tracing::subscriber::with_default(bootstrap_subscriber(), resolve_config)
        .context("Failed to load configuration")?;

    // Step 2: Initialize tracing at the configured level
    init_tracing(&config.logging).context("Failed to initialize logging")?;

    info!("Starting {}", aninfo_sync::build_info::banner());
    info!("Watch directory: {}", config.watch_dir.display());
    info!("Ledger: {}", config.ledger_path.display());

    // Step 3: External catalog clients
    let anilist = AniListClient::from_config(&config.http)
        .context("Failed to build AniList client")?;
    let jikan = JikanClient::from_config(&config.http)
        .context("Failed to build Jikan client")?;
    let resolver = TitleResolver::new(
        Arc::new(anilist),
        Arc::new(jikan),
        config.translation_cooldown(),
    );

    // Step 4: Processed-file ledger
    let ledger = ProcessedLedger::open(FileLedgerBackend::new(&config.ledger_path))
        .context("Failed to open processed-file ledger")?;

    // Step 5: Scan until killed
    let mut scan_loop = ScanLoop::new(
        config.watch_dir.clone(),
        config.scan_interval(),
        resolver,
        ledger,
    );
    scan_loop
        .run_forever()
        .await
        .context("Directory monitoring stopped")?;

    Ok(())
}

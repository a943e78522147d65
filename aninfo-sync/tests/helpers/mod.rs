//! Test Helper Utilities
//!
//! Shared utilities for testing aninfo-sync

#![allow(dead_code, unused_imports)]

pub mod fakes;
pub mod fixtures;
pub mod mock_server;

// Re-export commonly used items
pub use fakes::{FakeCatalog, FakeTranslator};
pub use fixtures::{episode_nfo, read_episode, tvshow_nfo, write_show};
pub use mock_server::{spawn_mock_catalog, MockCatalogServer};

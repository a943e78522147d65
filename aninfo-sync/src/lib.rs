//! aninfo-sync library interface for testing
//!
//! Exposes the reconciliation pipeline for integration tests and the binary.

pub mod build_info;
pub mod models;
pub mod services;
pub mod types;
pub mod workflow;

pub use crate::models::{ManagedField, NfoRecord, TitleMapping};
pub use crate::types::{CatalogEpisode, CatalogMatch, ClientError, IdTranslator, TitleCatalog};
pub use crate::workflow::{CycleReport, ScanLoop};

//! Data models shared by the reconciliation services

pub mod nfo_record;
pub mod title_mapping;

pub use nfo_record::{ManagedField, NfoRecord};
pub use title_mapping::TitleMapping;

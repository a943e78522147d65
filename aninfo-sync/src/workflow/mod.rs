//! Scan workflow orchestration

pub mod scan_loop;

pub use scan_loop::{CycleReport, ScanLoop};

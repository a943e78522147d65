//! # aninfo Common Library
//!
//! Shared code for the aninfo workspace:
//! - Error and result types
//! - TOML configuration model and layered resolution
//! - Tracing subscriber setup

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};

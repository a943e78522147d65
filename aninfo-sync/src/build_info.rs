//! Build identification captured by `build.rs`

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_HASH: &str = env!("GIT_HASH");
pub const BUILD_TIMESTAMP: &str = env!("BUILD_TIMESTAMP");

/// One-line startup banner, e.g. `aninfo-sync 0.1.0 (git 1a2b3c4d, built 2026-01-01T00:00:00Z)`
pub fn banner() -> String {
    format!(
        "aninfo-sync {} (git {}, built {})",
        VERSION, GIT_HASH, BUILD_TIMESTAMP
    )
}

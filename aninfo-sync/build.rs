//! Stamps the binary with the commit it was built from and the build time (UTC).

use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-changed=build.rs");

    let commit = commit_id().unwrap_or_else(|| "unknown".to_string());
    let built_at = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");

    println!("cargo:rustc-env=GIT_HASH={}", commit);
    println!("cargo:rustc-env=BUILD_TIMESTAMP={}", built_at);
}

/// Abbreviated commit id, with a `-dirty` suffix for uncommitted changes
fn commit_id() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--always", "--dirty", "--abbrev=8"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let id = String::from_utf8(output.stdout).ok()?.trim().to_string();
    (!id.is_empty()).then_some(id)
}

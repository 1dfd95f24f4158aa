//! Build script that stamps the binary with its own derived version.
//!
//! The same idea the tool applies to other projects: ask `git describe` when
//! building from a checkout, fall back to the manifest version for builds
//! from a published crate or a plain source archive. Never fails the build.

use std::process::Command;

fn main() {
    let version = Command::new("git")
        .args(["describe", "--tags", "--dirty", "--always"])
        .output()
        .ok()
        .and_then(|out| {
            if out.status.success() {
                String::from_utf8(out.stdout).ok()
            } else {
                None
            }
        })
        .map(|s| s.trim().trim_start_matches('v').to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=VCS_VERSION={}", version);
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs");
}

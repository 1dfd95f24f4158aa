//! Thin wrappers around the git executable.
//!
//! Everything here is best-effort: a missing git binary, a spawn failure, or
//! a non-zero exit all collapse to `None` so callers can treat "git had
//! nothing to say" as an ordinary fall-through rather than an error.

use std::path::Path;
use std::process::Command;

/// True when `root` itself is a git checkout, i.e. holds a `.git` directory.
///
/// Deliberately not an upward repository search: an unpacked source archive
/// sitting inside somebody else's checkout must not pick up that checkout's
/// tags.
pub fn is_git_checkout(root: &Path) -> bool {
    root.join(".git").is_dir()
}

/// Run git with `args` inside `root` and return its trimmed stdout.
pub fn run_git(root: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(root)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8(output.stdout).ok()?;
    Some(stdout.trim().to_string())
}

/// `git describe --tags --dirty --always` for the checkout at `root`.
///
/// Yields the nearest reachable tag with a `-dirty` suffix when the working
/// tree has uncommitted changes, or an abbreviated commit id when no tag is
/// reachable.
pub fn describe(root: &Path) -> Option<String> {
    run_git(root, &["describe", "--tags", "--dirty", "--always"])
}

//! The version-resolution chain.
//!
//! Derives one version string for the current project state by trying, in
//! order:
//!
//! 1. `git describe` on the checkout at the configured root
//! 2. the ref list substituted into the version file by `git archive`'s
//!    export-subst mechanism
//! 3. a previously frozen `__version__ = '...'` line in the version file
//! 4. the name of the project root directory (unpacked archives are
//!    conventionally named `<project>-<version>`)
//! 5. the configured default, if any
//!
//! The first applicable source wins and the rest are never consulted;
//! sources are not merged. A source whose preconditions are unmet (no
//! checkout, file missing, prefix mismatch) falls through silently. Only
//! when every source including the default is inapplicable does
//! [`resolve`] fail, with [`ResolveError::NoVersionAvailable`].
//!
//! The version file is always treated as inert text and scanned line by
//! line, never parsed as a document or evaluated: it may legitimately hold a
//! half-expanded template, and the whole point of the frozen form is that it
//! stays readable with nothing but a pattern match.

use std::collections::BTreeSet;
use std::fs;

use regex::Regex;
use thiserror::Error;

use crate::config::ResolverConfig;
use crate::git;

/// Failure of an entire resolution, not of an individual source.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Every source, including the configured default, was inapplicable.
    #[error("unable to compute a version from any source")]
    NoVersionAvailable,
}

/// Resolve the project version for the state described by `config`.
///
/// Tries each source in the fixed order given in the module docs and
/// returns the first hit. Calling this twice against unchanged repository
/// state returns the same string; nothing is cached and nothing is written.
///
/// # Errors
///
/// Returns [`ResolveError::NoVersionAvailable`] when no source and no
/// default produced a version. Everything short of that — an unspawnable or
/// failing git, a missing version file, a tag that does not carry the
/// configured prefix — is absorbed as "try the next source".
pub fn resolve(config: &ResolverConfig) -> Result<String, ResolveError> {
    if let Some(version) = version_from_git(config) {
        if config.verbose {
            eprintln!("got version from git describe: {}", version);
        }
        return Ok(version);
    }

    if let Some(version) = version_from_keyword(config) {
        if config.verbose {
            eprintln!("got version from expanded keyword: {}", version);
        }
        return Ok(version);
    }

    if let Some(version) = version_from_file(config) {
        if config.verbose {
            eprintln!(
                "got version from {}: {}",
                config.version_file.display(),
                version
            );
        }
        return Ok(version);
    }

    if let Some(version) = version_from_parentdir(config) {
        if config.verbose {
            eprintln!("got version from parent directory name: {}", version);
        }
        return Ok(version);
    }

    if let Some(version) = config.default.clone() {
        if config.verbose {
            eprintln!("got version from default: {}", version);
        }
        return Ok(version);
    }

    Err(ResolveError::NoVersionAvailable)
}

/// Ask `git describe` for the current checkout.
///
/// Applicable only when the root itself holds a `.git` directory. Describe
/// output that does not start with the tag prefix is treated as
/// inapplicable, not as an error: repositories may carry unrelated tags.
fn version_from_git(config: &ResolverConfig) -> Option<String> {
    if !git::is_git_checkout(&config.root) {
        if config.verbose {
            eprintln!(
                "{} does not appear to be a git checkout",
                config.root.display()
            );
        }
        return None;
    }

    let Some(described) = git::describe(&config.root) else {
        if config.verbose {
            eprintln!("unable to run git describe in {}", config.root.display());
        }
        return None;
    };

    match described.strip_prefix(&config.tag_prefix) {
        Some(version) => Some(version.to_string()),
        None => {
            if config.verbose {
                eprintln!(
                    "tag '{}' doesn't start with prefix '{}'",
                    described, config.tag_prefix
                );
            }
            None
        }
    }
}

/// Read the ref names that `git archive` substituted into the version file.
///
/// When the keyword is still the literal `$Format` marker the file came out
/// of a plain archive, so the checkout itself (if any) is the authoritative
/// source and the describe probe is re-run on its behalf.
fn version_from_keyword(config: &ResolverConfig) -> Option<String> {
    let keyword = expanded_keyword(config)?;
    if keyword.contains("$Format") {
        if config.verbose {
            eprintln!(
                "keyword in {} is unexpanded, asking git instead",
                config.version_file.display()
            );
        }
        return version_from_git(config);
    }
    Some(version_from_ref_names(&keyword, &config.tag_prefix))
}

/// Extract the raw `verstr = "..."` value from the version file, if any.
fn expanded_keyword(config: &ResolverConfig) -> Option<String> {
    let contents = fs::read_to_string(config.version_file_path()).ok()?;
    let keyword_line = Regex::new(r#"=\s*"(.*)""#).ok()?;
    contents
        .lines()
        .filter(|line| line.trim().starts_with("verstr ="))
        .find_map(|line| keyword_line.captures(line))
        .map(|caps| caps[1].to_string())
}

/// Pick a version out of an expanded ref list like `(HEAD, tag: v1.2.0)`.
///
/// The symbolic refs `HEAD` and `master` never name a version and are
/// discarded; of the rest, the lexicographically greatest ref carrying the
/// tag prefix wins, so repeated runs over the same file are deterministic
/// no matter what order git emitted the refs in. When nothing qualifies the
/// result is the literal `"unknown"`: the keyword was expanded, so this
/// source did apply, it just found no usable tag.
fn version_from_ref_names(keyword: &str, tag_prefix: &str) -> String {
    let refs: BTreeSet<&str> = keyword
        .trim()
        .trim_matches(['(', ')'])
        .split(',')
        .map(str::trim)
        .map(|r| r.strip_prefix("tag: ").unwrap_or(r))
        .filter(|r| *r != "HEAD" && *r != "master")
        .collect();

    for r in refs.iter().rev() {
        if let Some(version) = r.strip_prefix(tag_prefix) {
            return version.to_string();
        }
    }
    "unknown".to_string()
}

/// Scan the version file for a frozen `__version__ = '...'` line.
fn version_from_file(config: &ResolverConfig) -> Option<String> {
    let contents = fs::read_to_string(config.version_file_path()).ok()?;
    let version_line = Regex::new(r"^__version__ = '([^']+)'").ok()?;
    contents
        .lines()
        .find_map(|line| version_line.captures(line))
        .map(|caps| caps[1].to_string())
}

/// Infer a version from the name of the project root directory.
fn version_from_parentdir(config: &ResolverConfig) -> Option<String> {
    let root = fs::canonicalize(&config.root).ok()?;
    let dirname = root.file_name()?.to_str()?;
    match dirname.strip_prefix(&config.parentdir_prefix) {
        Some(version) => Some(version.to_string()),
        None => {
            if config.verbose {
                eprintln!(
                    "dirname '{}' doesn't start with prefix '{}'",
                    dirname, config.parentdir_prefix
                );
            }
            None
        }
    }
}

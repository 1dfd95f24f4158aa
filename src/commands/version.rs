//! Report the derived version command.
//!
//! This command runs the resolution chain for the current project state and
//! prints the result. It never writes anything; the same probes run again on
//! every invocation.
//!
//! # Examples
//!
//! ```bash
//! # Print the derived version (e.g., "1.2.0")
//! cargo vcs-version version
//!
//! # Get JSON output
//! cargo vcs-version version --format json
//!
//! # Show which source produced the version
//! cargo vcs-version version --verbose
//!
//! # Resolve a different project
//! cargo vcs-version version --root /path/to/project
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::config::ResolverConfig;
use crate::resolver;

/// Arguments for the `version` command.
#[derive(Parser, Debug)]
pub struct VersionArgs {
    /// Path to the project root.
    ///
    /// Defaults to the current directory. Must contain a Cargo.toml, which
    /// supplies defaults for the remaining options via its
    /// `[package.metadata.vcs-version]` table.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Version file path, relative to the project root.
    #[arg(long)]
    version_file: Option<PathBuf>,

    /// Prefix stripped from git tag names to recover the bare version.
    #[arg(long)]
    tag_prefix: Option<String>,

    /// Prefix stripped from the unpacked archive directory name.
    #[arg(long)]
    parentdir_prefix: Option<String>,

    /// Version to fall back on when no other source applies.
    #[arg(long)]
    default: Option<String>,

    /// Print per-source diagnostics on stderr while resolving.
    #[arg(long)]
    verbose: bool,

    /// Output format for the version.
    ///
    /// - `version`: Print just the version string (e.g., "1.2.0")
    /// - `json`: Print JSON with a version field
    #[arg(long, default_value = "version")]
    format: String,
}

impl VersionArgs {
    /// Manifest defaults overridden by whatever flags were given.
    fn resolver_config(&self) -> Result<ResolverConfig> {
        let mut config = ResolverConfig::load(&self.root)?;
        if let Some(version_file) = &self.version_file {
            config.version_file = version_file.clone();
        }
        if let Some(tag_prefix) = &self.tag_prefix {
            config.tag_prefix = tag_prefix.clone();
        }
        if let Some(parentdir_prefix) = &self.parentdir_prefix {
            config.parentdir_prefix = parentdir_prefix.clone();
        }
        if let Some(default) = &self.default {
            config.default = Some(default.clone());
        }
        config.verbose = self.verbose;
        Ok(config)
    }
}

/// Report the version derived from the current project state.
///
/// Runs the resolution chain (git describe, expanded keyword, frozen
/// version file, parent directory name, default) and prints the first hit.
///
/// # Errors
///
/// Returns an error if:
/// - The project's Cargo.toml cannot be read or parsed
/// - Every source, including the configured default, is inapplicable
///
/// # Example Output
///
/// With `--format version`:
/// ```text
/// 1.2.0
/// ```
///
/// With `--format json`:
/// ```json
/// {"version":"1.2.0"}
/// ```
pub fn version(args: VersionArgs) -> Result<()> {
    let config = args.resolver_config()?;
    let version = resolver::resolve(&config)?;

    match args.format.as_str() {
        "version" => println!("{}", version),
        "json" => println!("{{\"version\":\"{}\"}}", version),
        _ => anyhow::bail!("Invalid format: {}", args.format),
    }

    Ok(())
}

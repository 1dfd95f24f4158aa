//! Freeze the derived version into the plain version file.
//!
//! This is the packaging-time half of the tool: once a distribution archive
//! is being assembled, the version computed from the checkout is written
//! into the version file so that users of the archive (who have no git
//! metadata at all) still get a real version out of the resolution chain.
//!
//! # Examples
//!
//! ```bash
//! # Resolve and freeze into the configured version file
//! cargo vcs-version freeze
//!
//! # Freeze a fixed version without consulting any source
//! cargo vcs-version freeze --set 1.2.0
//! ```

use std::path::{
    Path,
    PathBuf,
};

use anyhow::{
    Context,
    Result,
};
use clap::Parser;

use crate::config::ResolverConfig;
use crate::resolver;

/// Header written at the top of the frozen version file.
const FROZEN_HEADER: &str = "\
# This file was generated by cargo-vcs-version from revision-control
# metadata, or from the parent directory name of an unpacked source archive.
# Distribution archives contain a pre-generated copy of this file.
";

/// Arguments for the `freeze` command.
#[derive(Parser, Debug)]
pub struct FreezeArgs {
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

    /// Freeze this exact version instead of resolving one.
    #[arg(long)]
    set: Option<String>,

    /// Print per-source diagnostics on stderr while resolving.
    #[arg(long)]
    verbose: bool,
}

impl FreezeArgs {
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

/// Resolve the current version and write it into the version file.
///
/// The file is overwritten with a header comment and a single
/// `__version__ = '<version>'` line, the exact form the frozen-file probe
/// of the resolution chain reads back.
///
/// # Errors
///
/// Returns an error if:
/// - The project's Cargo.toml cannot be read or parsed
/// - No version can be resolved and `--set` was not given
/// - The version file cannot be written
///
/// # Example Output
///
/// ```text
/// set _version.txt to '1.2.0'
/// ```
pub fn freeze(args: FreezeArgs) -> Result<()> {
    let config = args.resolver_config()?;
    let version = match &args.set {
        Some(version) => version.clone(),
        None => resolver::resolve(&config)?,
    };

    let path = config.version_file_path();
    write_version_file(&path, &version)?;
    println!("set {} to '{}'", config.version_file.display(), version);

    Ok(())
}

/// Overwrite `path` with the frozen form of `version`.
pub fn write_version_file(path: &Path, version: &str) -> Result<()> {
    let contents = format!("{}\n__version__ = '{}'\n", FROZEN_HEADER, version);
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("Cargo.toml"),
            "[package]\nname = \"myproject\"\nversion = \"0.0.0\"\n",
        )
        .unwrap();
        dir
    }

    fn args_for(root: &Path) -> FreezeArgs {
        FreezeArgs {
            root: root.to_path_buf(),
            version_file: None,
            tag_prefix: None,
            parentdir_prefix: None,
            default: None,
            set: None,
            verbose: false,
        }
    }

    #[test]
    fn test_freeze_set_version() {
        let dir = project();
        let mut args = args_for(dir.path());
        args.set = Some("1.2.0".to_string());
        assert!(freeze(args).is_ok());

        let contents = fs::read_to_string(dir.path().join("_version.txt")).unwrap();
        assert!(contents.contains("__version__ = '1.2.0'"));
    }

    #[test]
    fn test_freeze_resolved_default() {
        let dir = project();
        let mut args = args_for(dir.path());
        args.default = Some("0.0.0+unknown".to_string());
        assert!(freeze(args).is_ok());

        let contents = fs::read_to_string(dir.path().join("_version.txt")).unwrap();
        assert!(contents.contains("__version__ = '0.0.0+unknown'"));
    }

    #[test]
    fn test_freeze_round_trips_through_resolver() {
        let dir = project();
        let mut args = args_for(dir.path());
        args.set = Some("4.5.6".to_string());
        freeze(args).unwrap();

        // What freeze wrote is exactly what the frozen-file probe reads.
        let config = ResolverConfig::load(dir.path()).unwrap();
        assert_eq!(resolver::resolve(&config).unwrap(), "4.5.6");
    }

    #[test]
    fn test_freeze_nothing_resolvable() {
        let dir = project();
        assert!(freeze(args_for(dir.path())).is_err());
    }

    #[test]
    fn test_freeze_unwritable_target() {
        let dir = project();
        let mut args = args_for(dir.path());
        args.version_file = Some("no/such/dir/_version.txt".into());
        args.set = Some("1.0.0".to_string());
        assert!(freeze(args).is_err());
    }
}

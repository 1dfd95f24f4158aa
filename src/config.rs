//! Resolver configuration.
//!
//! All knobs live in one explicit, caller-owned object that is passed into
//! [`crate::resolver::resolve`]; there is no process-wide configuration
//! state. Defaults are read from the `[package.metadata.vcs-version]` table
//! of the project's Cargo.toml:
//!
//! ```toml
//! [package.metadata.vcs-version]
//! version-file = "_version.txt"
//! tag-prefix = "v"
//! parentdir-prefix = "myproject-"
//! default = "0.0.0+unknown"
//! ```
//!
//! Every key is optional: `version-file` defaults to `_version.txt`,
//! `tag-prefix` to `v`, and `parentdir-prefix` to the package name followed
//! by `-` (the conventional shape of an unpacked source archive directory,
//! e.g. `myproject-1.2.0`). `default` has no default.

use std::fs;
use std::path::PathBuf;

use anyhow::{
    Context,
    Result,
};

/// Configuration for one version resolution.
///
/// Immutable per call; construct it directly or via [`ResolverConfig::load`].
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Project root that every probe is anchored to.
    ///
    /// The `.git` presence check, the version file, and the directory-name
    /// probe all resolve against this path, so a resolution is a pure
    /// function of the config plus the filesystem state under it.
    pub root: PathBuf,

    /// Path of the version file, relative to `root`.
    ///
    /// Holds either the keyword form (`verstr = "..."`, tracked in git and
    /// rewritten by `git archive`) or the frozen form
    /// (`__version__ = '...'`, written into distribution archives).
    pub version_file: PathBuf,

    /// Prefix stripped from git tag names to recover the bare version.
    ///
    /// With tags like `v1.2.0` this is `v`; unprefixed tags use an empty
    /// string. Describe output that does not start with this prefix is
    /// ignored, not an error.
    pub tag_prefix: String,

    /// Prefix stripped from the unpacked archive directory name.
    ///
    /// A source archive of `myproject` 1.2.0 conventionally unpacks into
    /// `myproject-1.2.0`, so this is usually `myproject-`.
    pub parentdir_prefix: String,

    /// Last-resort version returned when every probe comes up empty.
    pub default: Option<String>,

    /// Emit per-probe diagnostics on stderr while resolving.
    pub verbose: bool,
}

impl ResolverConfig {
    /// Build a configuration for the project at `root`.
    ///
    /// Reads `root/Cargo.toml` and fills each field from the
    /// `[package.metadata.vcs-version]` table, falling back to the defaults
    /// described in the module docs. `verbose` starts out `false`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `root/Cargo.toml` cannot be read or parsed
    /// - `parentdir-prefix` is not configured and the manifest has no
    ///   `[package]` name to derive it from (e.g. a workspace root)
    pub fn load(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let manifest_path = root.join("Cargo.toml");
        let content = fs::read_to_string(&manifest_path)
            .with_context(|| format!("Failed to read {}", manifest_path.display()))?;
        let manifest: toml::Value = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", manifest_path.display()))?;

        let package = manifest.get("package");
        let meta = package
            .and_then(|p| p.get("metadata"))
            .and_then(|m| m.get("vcs-version"));
        let key = |name: &str| {
            meta.and_then(|m| m.get(name))
                .and_then(|v| v.as_str())
                .map(str::to_owned)
        };

        let parentdir_prefix = match key("parentdir-prefix") {
            Some(prefix) => prefix,
            None => {
                let name = package
                    .and_then(|p| p.get("name"))
                    .and_then(|n| n.as_str())
                    .with_context(|| {
                        format!(
                            "No [package] name in {}; set \
                             package.metadata.vcs-version.parentdir-prefix",
                            manifest_path.display()
                        )
                    })?;
                format!("{}-", name)
            }
        };

        Ok(Self {
            version_file: key("version-file")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("_version.txt")),
            tag_prefix: key("tag-prefix").unwrap_or_else(|| "v".to_string()),
            parentdir_prefix,
            default: key("default"),
            verbose: false,
            root,
        })
    }

    /// Absolute-or-relative path of the version file, anchored at `root`.
    pub fn version_file_path(&self) -> PathBuf {
        self.root.join(&self.version_file)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn project_with_manifest(content: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Cargo.toml"), content).unwrap();
        dir
    }

    #[test]
    fn test_load_defaults_from_package_name() {
        let dir = project_with_manifest(
            r#"
[package]
name = "myproject"
version = "0.0.0"
"#,
        );
        let config = ResolverConfig::load(dir.path()).unwrap();
        assert_eq!(config.version_file, PathBuf::from("_version.txt"));
        assert_eq!(config.tag_prefix, "v");
        assert_eq!(config.parentdir_prefix, "myproject-");
        assert_eq!(config.default, None);
        assert!(!config.verbose);
    }

    #[test]
    fn test_load_explicit_metadata() {
        let dir = project_with_manifest(
            r#"
[package]
name = "myproject"
version = "0.0.0"

[package.metadata.vcs-version]
version-file = "src/_version.txt"
tag-prefix = "myproject-"
parentdir-prefix = "myproject_"
default = "0.0.0+unknown"
"#,
        );
        let config = ResolverConfig::load(dir.path()).unwrap();
        assert_eq!(config.version_file, PathBuf::from("src/_version.txt"));
        assert_eq!(config.tag_prefix, "myproject-");
        assert_eq!(config.parentdir_prefix, "myproject_");
        assert_eq!(config.default, Some("0.0.0+unknown".to_string()));
    }

    #[test]
    fn test_load_missing_manifest() {
        let dir = TempDir::new().unwrap();
        let result = ResolverConfig::load(dir.path());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Failed to read"));
    }

    #[test]
    fn test_load_invalid_manifest() {
        let dir = project_with_manifest("not = valid = toml");
        assert!(ResolverConfig::load(dir.path()).is_err());
    }

    #[test]
    fn test_load_workspace_root_needs_explicit_parentdir_prefix() {
        let dir = project_with_manifest(
            r#"
[workspace]
members = ["member"]
"#,
        );
        let result = ResolverConfig::load(dir.path());
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("parentdir-prefix")
        );
    }

    #[test]
    fn test_version_file_path_is_anchored_at_root() {
        let dir = project_with_manifest(
            r#"
[package]
name = "myproject"
"#,
        );
        let config = ResolverConfig::load(dir.path()).unwrap();
        assert_eq!(
            config.version_file_path(),
            dir.path().join("_version.txt")
        );
    }
}

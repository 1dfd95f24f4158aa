//! Set up keyword expansion for source archives.
//!
//! Writes the tracked form of the version file, whose `verstr` keyword git
//! rewrites with the current ref names whenever `git archive` exports the
//! tree, and registers the file for that substitution in `.gitattributes`.
//! Archives produced by `git archive` (including forge download-from-tag
//! tarballs) then carry their version inside the file itself, with no git
//! metadata needed on the consuming side.
//!
//! # Examples
//!
//! ```bash
//! # Create the keyword file, mark it export-subst, and stage both
//! cargo vcs-version install
//!
//! # Use a different file location
//! cargo vcs-version install --version-file src/_version.txt
//! ```

use std::fs::OpenOptions;
use std::io::Write;
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
use crate::git;

/// Tracked form of the version file. The `$Format:%d$` marker is replaced
/// by git with the parenthesized ref names of the exported revision.
const KEYWORD_FILE: &str = "\
# This file is rewritten by `git archive` (via the export-subst attribute)
# to carry the ref names of the exported revision. In a working checkout it
# holds the unexpanded marker and the version comes from git itself.

verstr = \"$Format:%d$\"
";

/// Build-script snippet printed after a successful install.
const BUILD_RS_SNIPPET: &str = r#"
To freeze the derived version into your builds, call the resolver from
build.rs:

    use cargo_vcs_version::config::ResolverConfig;
    use cargo_vcs_version::resolver;

    fn main() {
        if let Ok(config) = ResolverConfig::load(".")
            && let Ok(version) = resolver::resolve(&config)
        {
            println!("cargo:rustc-env=CARGO_PKG_VERSION={version}");
            println!("cargo:rerun-if-changed=.git/HEAD");
        }
    }

and add cargo-vcs-version to [build-dependencies]."#;

/// Arguments for the `install` command.
#[derive(Parser, Debug)]
pub struct InstallArgs {
    /// Path to the project root.
    ///
    /// Defaults to the current directory. Must contain a Cargo.toml, which
    /// supplies the version-file default via its
    /// `[package.metadata.vcs-version]` table.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Version file path, relative to the project root.
    #[arg(long)]
    version_file: Option<PathBuf>,
}

/// Create the keyword version file and register it for export-subst.
///
/// Overwrites the version file with its tracked keyword form, appends a
/// `<version-file> export-subst` line to `.gitattributes` unless one is
/// already present, and stages both files (staging is best-effort, like
/// every other git interaction: outside a checkout it is silently skipped).
///
/// # Errors
///
/// Returns an error if:
/// - The project's Cargo.toml cannot be read or parsed
/// - The version file or `.gitattributes` cannot be written
pub fn install(args: InstallArgs) -> Result<()> {
    let mut config = ResolverConfig::load(&args.root)?;
    if let Some(version_file) = &args.version_file {
        config.version_file = version_file.clone();
    }

    let path = config.version_file_path();
    std::fs::write(&path, KEYWORD_FILE)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("created {}", config.version_file.display());

    if ensure_export_subst(&config.root, &config.version_file)? {
        println!("added export-subst entry to .gitattributes");
    }

    let version_file = config.version_file.to_string_lossy();
    git::run_git(&config.root, &["add", &version_file]);
    git::run_git(&config.root, &["add", ".gitattributes"]);

    println!("{}", BUILD_RS_SNIPPET);
    Ok(())
}

/// Append an export-subst attribute line for `version_file` unless an
/// equivalent entry already exists. Returns whether a line was added.
fn ensure_export_subst(root: &Path, version_file: &Path) -> Result<bool> {
    let attributes_path = root.join(".gitattributes");
    let entry = version_file.to_string_lossy();

    let existing = std::fs::read_to_string(&attributes_path).unwrap_or_default();
    let present = existing.lines().any(|line| {
        let mut fields = line.split_whitespace();
        fields.next() == Some(entry.as_ref()) && fields.any(|f| f == "export-subst")
    });
    if present {
        return Ok(false);
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&attributes_path)
        .with_context(|| format!("Failed to open {}", attributes_path.display()))?;
    writeln!(file, "{} export-subst", entry)
        .with_context(|| format!("Failed to write {}", attributes_path.display()))?;
    Ok(true)
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

    fn args_for(root: &Path) -> InstallArgs {
        InstallArgs {
            root: root.to_path_buf(),
            version_file: None,
        }
    }

    #[test]
    fn test_install_writes_keyword_file() {
        let dir = project();
        assert!(install(args_for(dir.path())).is_ok());

        let contents = fs::read_to_string(dir.path().join("_version.txt")).unwrap();
        assert!(contents.contains("verstr = \"$Format:%d$\""));
    }

    #[test]
    fn test_install_registers_export_subst() {
        let dir = project();
        install(args_for(dir.path())).unwrap();

        let attributes = fs::read_to_string(dir.path().join(".gitattributes")).unwrap();
        assert!(attributes.contains("_version.txt export-subst"));
    }

    #[test]
    fn test_install_is_idempotent_on_gitattributes() {
        let dir = project();
        install(args_for(dir.path())).unwrap();
        install(args_for(dir.path())).unwrap();

        let attributes = fs::read_to_string(dir.path().join(".gitattributes")).unwrap();
        let entries = attributes
            .lines()
            .filter(|line| line.contains("export-subst"))
            .count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_install_keeps_unrelated_attributes() {
        let dir = project();
        fs::write(dir.path().join(".gitattributes"), "*.png binary\n").unwrap();
        install(args_for(dir.path())).unwrap();

        let attributes = fs::read_to_string(dir.path().join(".gitattributes")).unwrap();
        assert!(attributes.contains("*.png binary"));
        assert!(attributes.contains("_version.txt export-subst"));
    }

    #[test]
    fn test_installed_file_reads_as_unexpanded() {
        use crate::resolver;

        let dir = project();
        let mut args = args_for(dir.path());
        args.version_file = Some("_version.txt".into());
        install(args).unwrap();

        // Outside a checkout the unexpanded marker yields nothing, so the
        // chain falls through to the default.
        let mut config = ResolverConfig::load(dir.path()).unwrap();
        config.default = Some("0.0.0+unknown".to_string());
        assert_eq!(resolver::resolve(&config).unwrap(), "0.0.0+unknown");
    }
}

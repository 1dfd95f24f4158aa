#![doc = include_str!("../README.md")]

/// Command implementations and argument types.
pub mod commands;
/// Resolver configuration.
pub mod config;
/// Thin wrappers around the git executable.
pub mod git;
/// The version-resolution chain.
///
/// # Example: Using in `build.rs` to set `CARGO_PKG_VERSION`
///
/// Add `cargo-vcs-version` as a build dependency in your `Cargo.toml`:
///
/// ```toml
/// [build-dependencies]
/// cargo-vcs-version = "0.1"
/// ```
///
/// Then in your `build.rs`:
///
/// ```no_run
/// use cargo_vcs_version::config::ResolverConfig;
/// use cargo_vcs_version::resolver;
///
/// fn main() {
///     if let Ok(config) = ResolverConfig::load(".")
///         && let Ok(version) = resolver::resolve(&config)
///     {
///         println!("cargo:rustc-env=CARGO_PKG_VERSION={}", version);
///         println!("cargo:rerun-if-changed=.git/HEAD");
///     }
/// }
/// ```
///
/// This overrides `CARGO_PKG_VERSION` with the version derived from:
/// 1. `git describe` on the checkout
/// 2. The ref names substituted by `git archive` (export-subst)
/// 3. A previously frozen version file
/// 4. The unpacked archive's directory name
/// 5. The configured default
pub mod resolver;

//! Cargo subcommand that derives a project version from version control.
//!
//! The version number is never hand-maintained: it is computed on demand
//! from git tags (`git describe`), from the ref names `git archive`
//! substitutes into a tracked file, from a previously frozen version file,
//! or from the name of the unpacked source directory — in that order, with
//! an optional configured default as the last resort.

use anyhow::Result;
use cargo_vcs_version::commands;
use cargo_vcs_version::commands::{
    FreezeArgs,
    InstallArgs,
    VersionArgs,
};
use clap::{
    CommandFactory,
    Parser,
    Subcommand,
};

#[derive(Parser, Debug)]
#[command(
    bin_name = "cargo",
    disable_version_flag = true,
    arg_required_else_help = false
)]
struct CargoArgs {
    #[command(subcommand)]
    subcmd: Option<TopCommand>,
}

#[derive(Subcommand, Debug)]
enum TopCommand {
    /// Derive the project version from version-control metadata
    #[command(name = "vcs-version")]
    VcsVersion(VcsVersionCli),
}

#[derive(Parser, Debug)]
#[command(
    version = env!("VCS_VERSION"),
    subcommand_required = false,
    arg_required_else_help = false
)]
struct VcsVersionCli {
    #[command(subcommand)]
    command: Option<VcsVersionCommand>,
}

#[derive(Parser, Debug)]
enum VcsVersionCommand {
    /// Report the version derived from the current project state
    #[command(name = "version")]
    Version(VersionArgs),
    /// Write the derived version into the plain version file
    #[command(name = "freeze")]
    Freeze(FreezeArgs),
    /// Create the keyword file and register it for export-subst
    #[command(name = "install")]
    Install(InstallArgs),
}

fn main() -> Result<()> {
    let args = CargoArgs::parse();

    if let Some(TopCommand::VcsVersion(cli)) = args.subcmd {
        if let Some(command) = cli.command {
            return match command {
                VcsVersionCommand::Version(args) => commands::version(args),
                VcsVersionCommand::Freeze(args) => commands::freeze(args),
                VcsVersionCommand::Install(args) => commands::install(args),
            };
        }

        // No inner command: show help
        VcsVersionCli::command().print_help()?;
        println!();
        return Ok(());
    }

    // No subcommand: show help
    CargoArgs::command().print_help()?;
    println!();
    Ok(())
}

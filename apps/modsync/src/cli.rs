//! Command line interface definition

use clap::{Args, Parser, Subcommand};
use modsync_types::{Arch, Branch, ColorChoice};
use std::path::PathBuf;

/// modsync - install, update and verify server modules
#[derive(Parser)]
#[command(name = "modsync")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Install, update and verify server modules")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "debug")]
    pub silent: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// What to operate on, shared by every command
#[derive(Args, Clone, Debug, Default)]
pub struct TargetArgs {
    /// Server version branch
    #[arg(short, long, value_enum)]
    pub branch: Option<Branch>,

    /// Server binary architecture
    #[arg(short, long, value_enum)]
    pub arch: Option<Arch>,

    /// Server installation path
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Server modules (repeatable)
    #[arg(short, long = "modules", value_name = "MODULE")]
    pub modules: Vec<String>,

    /// Give up after this many seconds (0 or less = no limit)
    #[arg(short, long, allow_negative_numbers = true)]
    pub timeout: Option<i64>,

    /// Enable the experimental release host (go-module, js-module-v2)
    #[arg(short, long)]
    pub github: bool,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Install server modules into a directory
    #[command(alias = "i")]
    Install {
        #[command(flatten)]
        target: TargetArgs,

        /// Also save each module's manifest, for later verification
        #[arg(short = 'M', long)]
        manifests: bool,
    },

    /// Verify the server files in a directory
    #[command(alias = "v")]
    Verify {
        #[command(flatten)]
        target: TargetArgs,

        /// Compare against the latest published manifests as well
        #[arg(short, long)]
        remote: bool,
    },

    /// Update outdated or damaged modules in a directory
    #[command(alias = "u")]
    Update {
        #[command(flatten)]
        target: TargetArgs,

        /// Accepted for symmetry with install; update always saves manifests
        #[arg(short = 'M', long)]
        manifests: bool,
    },
}

impl Commands {
    #[must_use]
    pub fn target(&self) -> &TargetArgs {
        match self {
            Commands::Install { target, .. }
            | Commands::Verify { target, .. }
            | Commands::Update { target, .. } => target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn short_flags_and_aliases() {
        let cli = Cli::try_parse_from([
            "modsync", "i", "-b", "rc", "-a", "x64_win32", "-p", "/srv/altv", "-m", "server", "-m",
            "js-module", "-t", "-1", "-M", "-g",
        ])
        .unwrap();

        let Commands::Install { target, manifests } = &cli.command else {
            panic!("expected install");
        };
        assert!(*manifests);
        assert_eq!(target.branch, Some(Branch::Rc));
        assert_eq!(target.arch, Some(Arch::X64Win32));
        assert_eq!(target.path, Some(PathBuf::from("/srv/altv")));
        assert_eq!(target.modules, ["server", "js-module"]);
        assert_eq!(target.timeout, Some(-1));
        assert!(target.github);
    }

    #[test]
    fn verify_takes_remote_flag() {
        let cli = Cli::try_parse_from(["modsync", "--json", "v", "-r"]).unwrap();
        assert!(cli.global.json);
        assert!(matches!(cli.command, Commands::Verify { remote: true, .. }));
    }

    #[test]
    fn debug_and_silent_conflict() {
        assert!(Cli::try_parse_from(["modsync", "-d", "-s", "update"]).is_err());
    }
}

pub mod commands;

use crate::core::error::{PpvError, Result};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "ppv",
    about = "Fetch package versions and metadata from PyPI",
    long_about = None,
    disable_version_flag = true,
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Packages to look up (shorthand for `ppv versions <packages...>`)
    pub packages: Vec<String>,

    /// Show only the latest stable version
    #[arg(short, long)]
    pub latest: bool,

    /// Include pre-release versions
    #[arg(short, long)]
    pub prerelease: bool,

    /// Output in JSON format
    #[arg(short, long)]
    pub json: bool,

    /// Show ppv version
    #[arg(short = 'v', long = "version")]
    pub version: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Display available versions of the given packages
    Versions {
        /// Packages to look up
        #[arg(required = true)]
        packages: Vec<String>,

        /// Show only the latest stable version
        #[arg(short, long)]
        latest: bool,

        /// Include pre-release versions
        #[arg(short, long)]
        prerelease: bool,

        /// Output in JSON format
        #[arg(short, long)]
        json: bool,
    },

    /// Display package metadata (name, summary, author, license, ...)
    Metadata {
        /// Packages to look up
        #[arg(required = true)]
        packages: Vec<String>,

        /// Include the long description in the output
        #[arg(short, long)]
        description: bool,

        /// Output in JSON format
        #[arg(short, long)]
        json: bool,
    },

    /// Display dependencies of specific package versions
    Deps {
        /// Interleaved `<package> [version]` pairs; version defaults to `latest`
        #[arg(required = true)]
        args: Vec<String>,

        /// Output in JSON format
        #[arg(short, long)]
        json: bool,
    },
}

/// Self-version line printed by `--version`; no network involved.
pub fn version_line() -> String {
    format!("ppv version {}", env!("CARGO_PKG_VERSION"))
}

/// Exit code for an argument-parse failure. Help output is a success;
/// everything else is an invalid argument, distinct from the not-found
/// and network codes.
pub fn parse_error_code(err: &clap::Error) -> i32 {
    match err.kind() {
        clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    if cli.version {
        println!("{}", version_line());
        return Ok(());
    }

    match cli.command {
        Some(Commands::Versions {
            packages,
            latest,
            prerelease,
            json,
        }) => commands::versions::execute(packages, latest, prerelease, json).await,

        Some(Commands::Metadata {
            packages,
            description,
            json,
        }) => commands::metadata::execute(packages, description, json).await,

        Some(Commands::Deps { args, json }) => commands::deps::execute(args, json).await,

        None => {
            if cli.packages.is_empty() {
                return Err(PpvError::InvalidArgument(
                    "no package name given; run 'ppv --help' for usage".into(),
                ));
            }
            commands::versions::execute(cli.packages, cli.latest, cli.prerelease, cli.json).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_packages_parse_as_top_level_args() {
        let cli = Cli::try_parse_from(["ppv", "pandas", "requests", "--json"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.packages, vec!["pandas", "requests"]);
        assert!(cli.json);
        assert!(!cli.latest);
    }

    #[test]
    fn versions_subcommand_parses_flags() {
        let cli =
            Cli::try_parse_from(["ppv", "versions", "pandas", "--latest", "--prerelease"]).unwrap();
        match cli.command {
            Some(Commands::Versions {
                packages,
                latest,
                prerelease,
                json,
            }) => {
                assert_eq!(packages, vec!["pandas"]);
                assert!(latest);
                assert!(prerelease);
                assert!(!json);
            }
            _ => panic!("expected versions subcommand"),
        }
    }

    #[test]
    fn metadata_subcommand_parses_description_flag() {
        let cli = Cli::try_parse_from(["ppv", "metadata", "pandas", "--description"]).unwrap();
        match cli.command {
            Some(Commands::Metadata {
                packages,
                description,
                ..
            }) => {
                assert_eq!(packages, vec!["pandas"]);
                assert!(description);
            }
            _ => panic!("expected metadata subcommand"),
        }
    }

    #[test]
    fn version_flag_short_circuits() {
        let cli = Cli::try_parse_from(["ppv", "--version"]).unwrap();
        assert!(cli.version);
        assert!(cli.command.is_none());
        assert!(cli.packages.is_empty());
    }

    #[test]
    fn version_line_is_literal_tool_version_semver() {
        let line = version_line();
        let re = regex::Regex::new(r"^ppv version \d+\.\d+\.\d+$").unwrap();
        assert!(re.is_match(&line), "unexpected version line: {line}");
    }

    #[test]
    fn versions_subcommand_requires_a_package() {
        assert!(Cli::try_parse_from(["ppv", "versions"]).is_err());
    }

    #[test]
    fn usage_errors_exit_with_invalid_argument_code() {
        let err = Cli::try_parse_from(["ppv", "versions"]).unwrap_err();
        assert_eq!(parse_error_code(&err), 1);

        let err = Cli::try_parse_from(["ppv", "--bogusflag"]).unwrap_err();
        assert_eq!(parse_error_code(&err), 1);
    }

    #[test]
    fn help_display_exits_zero() {
        let err = Cli::try_parse_from(["ppv", "--help"]).unwrap_err();
        assert_eq!(parse_error_code(&err), 0);
    }
}

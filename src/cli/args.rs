//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

/// Strata - dependency-aware package installer
///
/// Applies packages together with everything they depend on, sharing
/// dependencies between requesters and tearing them down in reverse order.
#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "STRATA_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply a package and its dependencies (dry run)
    // --version is the package constraint here
    #[command(disable_version_flag = true)]
    Apply(ApplyArgs),

    /// List installable packages and their versions
    Packages,

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Arguments for the apply command
#[derive(Parser, Debug)]
pub struct ApplyArgs {
    /// Package to apply, e.g. `kyma` or `docker.io/pkgs/kyma`
    pub package: String,

    /// Version constraint
    #[arg(long = "version", value_name = "CONSTRAINT", default_value = ">=0.0")]
    pub constraint: String,

    /// Kubernetes namespace (defaults to kubernetes.namespace from config)
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Kubernetes cluster url (defaults to kubernetes.url from config)
    #[arg(long)]
    pub url: Option<String>,

    /// Package parameter as JSON
    #[arg(short, long, value_parser = parse_json)]
    pub parameter: Option<Value>,

    /// Delete the package again after applying it
    #[arg(long)]
    pub teardown: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

fn parse_json(s: &str) -> Result<Value, String> {
    serde_json::from_str(s).map_err(|e| format!("invalid JSON: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_apply_defaults() {
        let cli = Cli::try_parse_from(["strata", "apply", "kyma"]).unwrap();
        match cli.command {
            Commands::Apply(args) => {
                assert_eq!(args.package, "kyma");
                assert_eq!(args.constraint, ">=0.0");
                assert!(args.namespace.is_none());
                assert!(args.parameter.is_none());
                assert!(!args.teardown);
            }
            _ => panic!("Expected Apply command"),
        }
    }

    #[test]
    fn parse_apply_with_parameter() {
        let cli = Cli::try_parse_from([
            "strata",
            "-vv",
            "apply",
            "istio",
            "--version",
            "~1.7",
            "-n",
            "istio-system",
            "--parameter",
            r#"{"pilot":{"instances":2}}"#,
            "--teardown",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Apply(args) => {
                assert_eq!(args.constraint, "~1.7");
                assert_eq!(args.namespace.as_deref(), Some("istio-system"));
                assert_eq!(args.parameter.unwrap()["pilot"]["instances"], 2);
                assert!(args.teardown);
            }
            _ => panic!("Expected Apply command"),
        }
    }

    #[test]
    fn version_flag_stays_on_top_level() {
        let err = Cli::try_parse_from(["strata", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);

        let err = Cli::try_parse_from(["strata", "packages", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);

        let cli = Cli::try_parse_from(["strata", "apply", "cluster", "--version", ">=1.0"]).unwrap();
        match cli.command {
            Commands::Apply(args) => assert_eq!(args.constraint, ">=1.0"),
            _ => panic!("Expected Apply command"),
        }
    }

    #[test]
    fn rejects_invalid_parameter() {
        let result = Cli::try_parse_from(["strata", "apply", "istio", "--parameter", "{oops"]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_config_init() {
        let cli = Cli::try_parse_from(["strata", "config", "init", "--force"]).unwrap();
        match cli.command {
            Commands::Config(ConfigArgs {
                action: Some(ConfigAction::Init { force }),
            }) => assert!(force),
            _ => panic!("Expected Config Init command"),
        }
    }
}

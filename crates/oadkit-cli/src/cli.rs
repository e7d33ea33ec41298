use clap::{Args, Parser, Subcommand};
use oadkit::core::config::ConfigFormat;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "OADKit Developers",
    version,
    about = "OADKit CLI - Assemble and inspect multidisciplinary aircraft design problems described in TOML or YAML.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assemble a process description and print the resulting model and optimization setup.
    Check(CheckArgs),
    /// List the components available to a process description.
    ListModules(ListModulesArgs),
    /// List every variable declared by the components of a model.
    ListVariables(ListVariablesArgs),
    /// Write a sample process description to get started.
    GenConf(GenConfArgs),
}

/// Arguments for the `check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the process description file (.toml, .yaml or .yml).
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Force the encoding instead of deriving it from the file extension.
    #[arg(short, long, value_name = "toml|yaml")]
    pub format: Option<ConfigFormat>,
}

/// Arguments for the `list-modules` subcommand.
#[derive(Args, Debug)]
pub struct ListModulesArgs {
    /// Also scan the module folders declared in this process description.
    #[arg(short, long, value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Additional module folder to scan. Can be used multiple times.
    #[arg(long = "folder", value_name = "DIR")]
    pub folders: Vec<PathBuf>,
}

/// Arguments for the `list-variables` subcommand.
#[derive(Args, Debug)]
pub struct ListVariablesArgs {
    /// Path to the process description file.
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// A variable description file (`name || description` per line) applied on top of the
    /// ones found in module folders.
    #[arg(short, long, value_name = "FILE")]
    pub descriptions: Option<PathBuf>,
}

/// Arguments for the `gen-conf` subcommand.
#[derive(Args, Debug)]
pub struct GenConfArgs {
    /// Where to write the sample process description.
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Encoding of the generated file. Defaults to the one implied by the extension, or TOML.
    #[arg(short, long, value_name = "toml|yaml")]
    pub format: Option<ConfigFormat>,

    /// Overwrite the file if it already exists.
    #[arg(long)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_are_accepted_after_subcommand() {
        let cli = Cli::try_parse_from(["oadkit", "check", "process.yml", "-vv", "--format", "yaml"]).unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.format, Some(ConfigFormat::Yaml));
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["oadkit", "-q", "-v", "list-modules"]).is_err());
    }

    #[test]
    fn repeated_folders_are_collected() {
        let cli = Cli::try_parse_from([
            "oadkit",
            "list-modules",
            "--folder",
            "a",
            "--folder",
            "b",
        ])
        .unwrap();
        let Commands::ListModules(args) = cli.command else {
            panic!("expected list-modules");
        };
        assert_eq!(args.folders, vec![PathBuf::from("a"), PathBuf::from("b")]);
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["oadkit", "gen-conf", "out.cfg", "--format", "json"]).is_err());
    }
}

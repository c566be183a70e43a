use clap::ArgAction;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use clap::ValueHint;
use clap::builder::FalseyValueParser;
use serde::Deserialize;
use std::path::PathBuf;

use clibones_common::LogLevel;
use clibones_manifest::BuildBackend;
use clibones_manifest::DEFAULT_MANIFEST;

const AFTER_HELP: &str =
    "Use --longhelp for the full description. Use --format json for machine-readable output.";

const LONG_ABOUT: &str = "\
Keep the [project] and [tool.poetry] tables of a pyproject.toml in agreement.\n\
\n\
`check` compares every shared field under its own equivalence rule and exits\n\
with the number of problems found, so a clean manifest exits 0.";

const AFTER_LONG_HELP: &str = r#"CONFIGURATION:
    Defaults are read from the [clibones] table of the first file found:
      --config FILE, ./.clibonesrc, ~/.local/clibones.conf
    Command-line flags win over environment variables, which win over the file.

ENVIRONMENT:
    CLIBONES_LOGLEVEL    Default for --loglevel
    CLIBONES_LOG         Default for --logfile
    CLIBONES_LOG_FORMAT  json for JSON log lines
    CLIBONES_LOG_STREAM  stdout to log to stdout instead of stderr
    RUST_LOG             Overrides the log level entirely
    NO_COLOR             Disables colored output

EXAMPLES:
    clibones check
    clibones check pyproject.toml other/pyproject.toml --json
    clibones --debug check
    clibones swap-build-system hatch
    clibones module-init --package-dir src/demo"#;

#[derive(Parser, Debug)]
#[command(name = "clibones")]
#[command(author, version)]
#[command(about = "Cross-check the [project] and [tool.poetry] tables of a pyproject.toml")]
#[command(long_about = LONG_ABOUT)]
#[command(after_help = AFTER_HELP)]
#[command(after_long_help = AFTER_LONG_HELP)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file with a [clibones] table
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        value_hint = ValueHint::FilePath,
        help_heading = "Config Options"
    )]
    pub config: Option<PathBuf>,

    /// Logging level: debug, info, warning, error or critical
    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        env = "CLIBONES_LOGLEVEL",
        help_heading = "Logging Options"
    )]
    pub loglevel: Option<LogLevel>,

    /// Shorthand for --loglevel debug
    #[arg(long, global = true, help_heading = "Logging Options")]
    pub debug: bool,

    /// Only log errors (overrides --debug and --loglevel)
    #[arg(long, global = true, help_heading = "Logging Options")]
    pub quiet: bool,

    /// Append log lines to FILE instead of stderr
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        env = "CLIBONES_LOG",
        value_hint = ValueHint::FilePath,
        help_heading = "Logging Options"
    )]
    pub logfile: Option<PathBuf>,

    /// Output format (text or json)
    #[arg(
        short,
        long,
        global = true,
        value_enum,
        value_name = "FORMAT",
        help_heading = "Output Options"
    )]
    pub format: Option<OutputFormat>,

    /// Shorthand for --format json
    #[arg(long, global = true, help_heading = "Output Options")]
    pub json: bool,

    /// Disable colored output (also respects NO_COLOR)
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new(),
        help_heading = "Output Options"
    )]
    pub no_color: bool,

    /// Print the long description and exit
    #[arg(long)]
    pub longhelp: bool,
}

impl Cli {
    /// Level selected on the command line or through the environment.
    /// `--quiet` beats `--debug`, which beats `--loglevel`.
    pub fn requested_level(&self) -> Option<LogLevel> {
        if self.quiet {
            Some(LogLevel::Error)
        } else if self.debug {
            Some(LogLevel::Debug)
        } else {
            self.loglevel
        }
    }

    pub fn requested_format(&self) -> Option<OutputFormat> {
        if self.json {
            Some(OutputFormat::Json)
        } else {
            self.format
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Reconcile [project] and [tool.poetry] of one or more manifests
    #[command(long_about = "\
Reconcile [project] and [tool.poetry] of one or more manifests.

Every finding is logged; the summary goes to stdout. The exit status is the
total number of problems across all manifests (capped at 255).")]
    Check {
        /// Manifests to check (default: ./pyproject.toml)
        #[arg(value_name = "MANIFEST", value_hint = ValueHint::FilePath)]
        manifests: Vec<PathBuf>,
    },

    /// Switch [build-system] to the hatch or poetry backend
    SwapBuildSystem {
        /// Backend to build with: hatch or poetry
        #[arg(value_name = "BACKEND")]
        backend: BuildBackend,

        /// Manifest to rewrite
        #[arg(
            long,
            value_name = "FILE",
            default_value = DEFAULT_MANIFEST,
            value_hint = ValueHint::FilePath
        )]
        manifest: PathBuf,
    },

    /// Generate DIR/__init__.py from the README and the manifest version
    ModuleInit {
        /// Package directory that receives __init__.py
        #[arg(long, value_name = "DIR", value_hint = ValueHint::DirPath)]
        package_dir: PathBuf,

        /// README used as the module docstring
        #[arg(
            long,
            value_name = "FILE",
            default_value = "README.md",
            value_hint = ValueHint::FilePath
        )]
        readme: PathBuf,

        /// Manifest the version is read from
        #[arg(
            long,
            value_name = "FILE",
            default_value = DEFAULT_MANIFEST,
            value_hint = ValueHint::FilePath
        )]
        manifest: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

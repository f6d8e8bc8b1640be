//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// modmap - dynamic module resolution with a compile cache
///
/// Resolves identifiers to source through the configured roots, caches the
/// result on disk and reports the origin every load claims.
#[derive(Parser, Debug)]
#[command(name = "modmap")]
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
    #[arg(short, long, global = true, env = "MODMAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local .modmap.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load identifiers, from the cache when possible
    Load(LoadArgs),

    /// Cache every identifier the resolvers can list
    Prime,

    /// Write hint files for every listed identifier
    Hints(HintsArgs),

    /// Purge identifiers and their recorded dependencies from the cache
    Purge(PurgeArgs),

    /// Remove the whole cache directory
    Clear(ClearArgs),

    /// Show what is cached for an identifier
    Show(ShowArgs),

    /// Print what a source reference serves and the origin it reports
    Read(ReadArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Arguments for the load command
#[derive(Parser, Debug)]
pub struct LoadArgs {
    /// Identifiers to load, e.g. App\Model\User or App/Model/User
    #[arg(required = true)]
    pub identifiers: Vec<String>,

    /// Bypass the cache for this run
    #[arg(long)]
    pub no_cache: bool,
}

/// Arguments for the hints command
#[derive(Parser, Debug)]
pub struct HintsArgs {
    /// Directory to write hint files into
    pub target: PathBuf,
}

/// Arguments for the purge command
#[derive(Parser, Debug)]
pub struct PurgeArgs {
    /// Identifiers to purge
    #[arg(required = true)]
    pub identifiers: Vec<String>,
}

/// Arguments for the clear command
#[derive(Parser, Debug)]
pub struct ClearArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the show command
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Identifier to inspect
    pub identifier: String,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the read command
#[derive(Parser, Debug)]
pub struct ReadArgs {
    /// Reference URL, e.g. modmap-include://-/<cached file>,<original file>
    pub reference: String,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Config subcommand
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
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for inspection commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

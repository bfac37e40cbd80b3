//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// chunkcache - digest location cache for chunked layers
///
/// Builds and queries the per-layer cache that lets a puller reuse files
/// and chunks it already has, and reports sparse regions of files.
#[derive(Parser, Debug)]
#[command(name = "chunkcache")]
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
    #[arg(short, long, global = true, env = "CHUNKCACHE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the location cache for a layer TOC and store it
    Build(BuildArgs),

    /// Look up a digest or fingerprint in a stored cache
    Lookup(LookupArgs),

    /// Report zero runs that would be stored as holes
    Holes(HolesArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Arguments for the build command
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Path to the TOC JSON document
    pub toc: PathBuf,

    /// Layer id the cache is stored under
    #[arg(short, long)]
    pub layer: String,

    /// Store directory (defaults to config or data dir)
    #[arg(short, long)]
    pub store: Option<PathBuf>,
}

/// Arguments for the lookup command
#[derive(Parser, Debug)]
pub struct LookupArgs {
    /// Digest (`sha256:...`) or hardlink fingerprint to look up
    pub digest: String,

    /// Layer id the cache is stored under
    #[arg(short, long)]
    pub layer: String,

    /// Store directory (defaults to config or data dir)
    #[arg(short, long)]
    pub store: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the holes command
#[derive(Parser, Debug)]
pub struct HolesArgs {
    /// File to scan
    pub file: PathBuf,

    /// Minimum zero run reported as a hole (default: from config)
    #[arg(short, long)]
    pub threshold: Option<u64>,
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

    /// Write a default configuration file
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for lookup results
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text
    Plain,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_build() {
        let cli = Cli::parse_from(["chunkcache", "build", "toc.json", "--layer", "abc"]);
        match cli.command {
            Commands::Build(args) => {
                assert_eq!(args.toc, PathBuf::from("toc.json"));
                assert_eq!(args.layer, "abc");
                assert!(args.store.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parse_lookup_json() {
        let cli = Cli::parse_from([
            "chunkcache",
            "-vv",
            "lookup",
            "sha256:aa",
            "-l",
            "abc",
            "--format",
            "json",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Lookup(args) => {
                assert_eq!(args.digest, "sha256:aa");
                assert!(matches!(args.format, OutputFormat::Json));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn lookup_requires_layer() {
        assert!(Cli::try_parse_from(["chunkcache", "lookup", "sha256:aa"]).is_err());
    }
}

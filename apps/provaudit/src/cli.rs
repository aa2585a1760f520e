//! Command line interface definition

use clap::{Args, Parser, Subcommand};
use provaudit_types::{ColorChoice, DecodePolicy, PathMatch, RegistryBackend};
use std::path::PathBuf;

/// provaudit - check that published packages match their tagged sources
#[derive(Parser)]
#[command(name = "provaudit")]
#[command(version)]
#[command(about = "Compare registry artifacts against source tag archives", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Args)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging to the logs directory
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Audit every published version of a package against its repository
    #[command(alias = "a")]
    Audit(AuditArgs),

    /// List the published versions of a package, newest first
    #[command(alias = "ls")]
    Versions {
        /// Package name on the registry
        package: String,

        #[command(flatten)]
        registry: RegistryArgs,
    },

    /// Compare a registry artifact and a source archive already on disk
    Compare {
        /// Wheel or sdist from the registry
        registry_archive: PathBuf,

        /// Tag archive from the source host
        source_archive: PathBuf,

        /// Package name used to anchor archive paths
        #[arg(long)]
        package: String,

        #[command(flatten)]
        compare: CompareArgs,

        /// Print every differing line
        #[arg(long)]
        full_diff: bool,

        /// Exit with status 2 when the archives differ
        #[arg(long)]
        fail_on_mismatch: bool,
    },
}

#[derive(Args)]
pub struct AuditArgs {
    /// Package name on the registry
    pub package: String,

    /// Source repository as owner/repo
    #[arg(long, value_name = "OWNER/REPO")]
    pub repo: String,

    /// Only audit these versions (comma separated)
    #[arg(long, value_delimiter = ',', value_name = "VERSIONS")]
    pub versions: Vec<String>,

    /// Versions audited concurrently
    #[arg(short, long)]
    pub jobs: Option<usize>,

    #[command(flatten)]
    pub registry: RegistryArgs,

    /// Prefix prepended to the version to form the tag name
    #[arg(long, value_name = "PREFIX")]
    pub tag_prefix: Option<String>,

    /// Write fetched artifacts under this directory
    #[arg(long, value_name = "DIR", conflicts_with = "no_staging")]
    pub staging_dir: Option<PathBuf>,

    /// Do not write fetched artifacts to disk
    #[arg(long)]
    pub no_staging: bool,

    #[command(flatten)]
    pub compare: CompareArgs,

    /// Print every differing line
    #[arg(long)]
    pub full_diff: bool,

    /// Exit with status 2 when any version mismatches
    #[arg(long)]
    pub fail_on_mismatch: bool,
}

/// Where versions and registry artifacts come from
#[derive(Args)]
pub struct RegistryArgs {
    /// Registry access backend
    #[arg(long, value_enum)]
    pub backend: Option<RegistryBackend>,

    /// Registry base URL for the api backend
    #[arg(long, value_name = "URL")]
    pub index_url: Option<String>,

    /// Python interpreter for the pip backend
    #[arg(long, value_name = "PATH")]
    pub python: Option<String>,
}

/// How archives are compared
#[derive(Args)]
pub struct CompareArgs {
    /// Handling of files that are not valid UTF-8
    #[arg(long, value_enum)]
    pub decode: Option<DecodePolicy>,

    /// How archive paths are anchored at the package directory
    #[arg(long = "match", value_enum)]
    pub path_match: Option<PathMatch>,
}

impl Commands {
    /// Whether the full line listing was requested
    pub fn full_diff(&self) -> bool {
        match self {
            Commands::Audit(args) => args.full_diff,
            Commands::Compare { full_diff, .. } => *full_diff,
            Commands::Versions { .. } => false,
        }
    }
}

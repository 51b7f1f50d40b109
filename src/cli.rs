use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "ipa-repo",
    about = "IPA Repository - keeps a JSON app catalog in sync with a directory of .ipa files",
    version,
    author
)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Catalog file to read and update (overrides config, defaults to repo.json)
    #[arg(long, global = true, value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    /// Directory scanned for .ipa archives (overrides config, defaults to /ipas)
    #[arg(long, global = true, value_name = "DIR")]
    pub ipa_dir: Option<PathBuf>,

    /// Base URL prepended to archive file names in download links
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan the archive directory and add new versions to the catalog (default)
    Update {
        /// Report what would be added without writing the catalog
        #[arg(long)]
        dry_run: bool,
    },

    /// List all apps and versions recorded in the catalog
    List,

    /// Print the metadata embedded in a single archive
    Inspect {
        /// Path to the .ipa archive
        #[arg(value_name = "ARCHIVE")]
        archive: PathBuf,
    },
}

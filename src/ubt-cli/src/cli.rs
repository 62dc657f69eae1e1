//! CLI argument definitions for ubt.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ubt")]
#[command(about = "Unity asset bundle extractor and repacker", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract a single bundle to `<stem>_extracted` (Textures + TextAssets)
    Unpack {
        /// Path to the .bundle file
        bundle: PathBuf,
    },

    /// Extract assets with type filtering and metadata sidecars
    Extract {
        /// Path to the .bundle file
        bundle: PathBuf,

        /// Output directory (default: `<stem>_extracted`)
        output: Option<PathBuf>,

        /// Asset types to extract (repeatable; default: all)
        #[arg(long = "type", value_name = "TYPE")]
        types: Vec<String>,

        /// Disable per-type subfolders in the output
        #[arg(long)]
        flat: bool,

        /// Simulate without writing files
        #[arg(long)]
        dry_run: bool,

        /// Path to write the extraction log
        #[arg(long)]
        log: Option<PathBuf>,
    },

    /// Extract every bundle under a directory
    ExtractAll {
        /// Directory to scan for .bundle/.unity3d/.assets files
        input: PathBuf,

        /// Output base directory (default: `output`)
        output: Option<PathBuf>,

        /// Asset types to extract (repeatable; default: all)
        #[arg(long = "type", value_name = "TYPE")]
        types: Vec<String>,

        /// Disable per-type subfolders in the output
        #[arg(long)]
        flat: bool,

        /// Simulate without writing files
        #[arg(long)]
        dry_run: bool,

        /// Path to write the combined extraction log
        #[arg(long)]
        log: Option<PathBuf>,
    },

    /// Create a modified bundle from edited files (original preserved)
    Repack {
        /// Path to the original .bundle file
        bundle: PathBuf,

        /// Folder with edited files (default: `<stem>_extracted` beside the bundle)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output bundle path (default: `modified_<name>` beside the bundle)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Disable compression for faster processing
        #[arg(long)]
        fast: bool,

        /// Asset types to re-import (repeatable; default: all re-importable)
        #[arg(long = "type", value_name = "TYPE")]
        types: Vec<String>,

        /// Report would-be changes without writing
        #[arg(long)]
        dry_run: bool,

        /// Modification log path (default: `modifications.json` beside the output)
        #[arg(long)]
        log: Option<PathBuf>,
    },

    /// Repack every bundle that has an extracted folder
    RepackAll {
        /// Directory containing the original bundles
        base_dir: PathBuf,

        /// Directory containing the extracted trees, one per bundle stem
        /// (default: `<stem>_extracted` folders beside the bundles)
        mod_dir: Option<PathBuf>,

        /// Output directory (default: `repacked`)
        out_dir: Option<PathBuf>,

        /// Disable compression for faster processing
        #[arg(long)]
        fast: bool,

        /// Asset types to re-import (repeatable; default: all re-importable)
        #[arg(long = "type", value_name = "TYPE")]
        types: Vec<String>,

        /// Report would-be changes without writing
        #[arg(long)]
        dry_run: bool,

        /// Modification log path (default: `modifications.json` in the output directory)
        #[arg(long)]
        log: Option<PathBuf>,
    },

    /// Validate asset integrity in a bundle
    Verify {
        /// Path to the .bundle file
        bundle: PathBuf,
    },

    /// Show the modification log
    History {
        /// Modification log path
        #[arg(long, default_value = "modifications.json")]
        log: PathBuf,
    },
}

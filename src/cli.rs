//! Command line arguments

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "formwright", version, about = "Versioned form schema editor")]
pub struct Cli {
    /// Directory holding configuration documents (overrides config file and FORMWRIGHT_STORE_DIR)
    #[arg(long, global = true)]
    pub store_dir: Option<PathBuf>,

    /// Editor config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand)]
pub enum Cmd {
    /// Seed the default configuration if it does not exist
    Init,
    /// Print a configuration as JSON
    Show {
        #[arg(long, default_value = "default")]
        id: String,
    },
    /// Apply a JSON-encoded schema mutation and save it as a draft
    Mutate {
        /// e.g. '{"op":"deleteSection","sectionKey":"extra"}'
        mutation: String,
        #[arg(long, default_value = "default")]
        id: String,
    },
    /// Publish the current draft as the next minor version
    Publish {
        #[arg(long, default_value = "default")]
        id: String,
    },
    /// Discard the current draft
    Discard {
        #[arg(long, default_value = "default")]
        id: String,
    },
    /// Restore the previously published version
    Rollback {
        #[arg(long, default_value = "default")]
        id: String,
    },
    /// Evaluate field values against the active schema
    Evaluate {
        /// JSON object of field key -> value
        #[arg(default_value = "{}")]
        values: String,
        /// Template whose configuration should be used
        #[arg(long)]
        template: Option<String>,
        /// Render read-only, as the administrator preview
        #[arg(long)]
        preview: bool,
    },
}

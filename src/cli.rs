//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand, ValueEnum};
use folio_core::{Collection, search::DEFAULT_LIMIT};
use std::path::PathBuf;

/// Folio documentation reader CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root; `folio.toml` and relative paths are resolved from here
    #[arg(short, long, global = true)]
    pub root: Option<PathBuf>,

    /// Config file name (default: folio.toml)
    #[arg(short = 'C', long, default_value = "folio.toml", global = true)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Collection selector on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionArg {
    Primary,
    Secondary,
}

impl From<CollectionArg> for Collection {
    fn from(arg: CollectionArg) -> Self {
        match arg {
            CollectionArg::Primary => Collection::Primary,
            CollectionArg::Secondary => Collection::Secondary,
        }
    }
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Render one document the way the reader shows it
    Render {
        /// Document identifier (default: `[viewer] default`)
        id: Option<String>,

        /// Collection to read from
        #[arg(short, long, value_enum)]
        collection: Option<CollectionArg>,

        /// Write the page here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rank documents against a query
    Search {
        #[arg(required = true)]
        query: Vec<String>,

        /// Maximum number of results
        #[arg(short = 'n', long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,

        /// Collection to search
        #[arg(short, long, value_enum)]
        collection: Option<CollectionArg>,
    },

    /// Print a markdown file with authoring artifacts removed
    Sanitize {
        file: PathBuf,
    },

    /// Rebuild `index.json` and `search.json` from the collection sources
    Index {
        /// Only this collection (default: both)
        #[arg(short, long, value_enum)]
        collection: Option<CollectionArg>,
    },

    /// Serve the site with rendered reader pages
    Serve {
        /// Interface to bind on
        #[arg(short, long)]
        interface: Option<String>,

        /// The port you should provide
        #[arg(short, long)]
        port: Option<u16>,
    },
}

impl Cli {
    /// Collection named by the command, if it takes one.
    pub fn collection(&self) -> Option<Collection> {
        match &self.command {
            Commands::Render { collection, .. }
            | Commands::Search { collection, .. }
            | Commands::Index { collection } => collection.map(Collection::from),
            Commands::Sanitize { .. } | Commands::Serve { .. } => None,
        }
    }
}

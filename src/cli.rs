use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "diagramerz")]
#[command(about = "Generate Mermaid class and sequence diagrams from Java sources")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file (TOML). Defaults to $DIAGRAMERZ_CONFIG, then the user config dir.
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `warn,diagramerz::model=debug`.
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Class diagram of every class, interface and enum found.
    Class {
        /// `.java` files, directories, or `.zip`/`.jar` source archives.
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,

        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Call sequence from one entry method, or from the first public methods found.
    Sequence {
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,

        #[arg(long, value_name = "NAME", requires = "method")]
        class: Option<String>,

        #[arg(long, value_name = "NAME", requires = "class")]
        method: Option<String>,

        #[arg(long, value_name = "N")]
        max_depth: Option<usize>,

        #[arg(long, value_name = "N")]
        max_entries: Option<usize>,

        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// The extracted model and per-unit ingest reports as JSON.
    Model {
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,

        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

use std::path::PathBuf;
use thiserror::Error;

/// Failure of the parsing collaborator for a whole source unit.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read archive {path}: {message}")]
    Archive { path: PathBuf, message: String },

    #[error("failed to load the Java grammar: {message}")]
    Grammar { message: String },

    #[error("parser produced no syntax tree for {origin}")]
    NoTree { origin: String },
}

/// Failure to extract one declaration; the rest of the unit is still ingested.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeclarationError {
    #[error("{origin}:{line}: syntax error inside {kind} `{name}`")]
    Malformed {
        origin: String,
        kind: &'static str,
        name: String,
        line: usize,
    },

    #[error("{origin}:{line}: {kind} declaration without a name")]
    Unnamed {
        origin: String,
        kind: &'static str,
        line: usize,
    },
}

impl DeclarationError {
    pub fn line(&self) -> usize {
        match self {
            Self::Malformed { line, .. } | Self::Unnamed { line, .. } => *line,
        }
    }
}

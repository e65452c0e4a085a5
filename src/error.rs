//! Error types for pgdock

use thiserror::Error;

use crate::lifecycle::ImportStep;

#[derive(Error, Debug)]
pub enum PgDockError {
    #[error("required option: {0}")]
    MissingOption(&'static str),

    #[error("required option: sql file to import")]
    MissingSqlFile,

    #[error("failed to pull image {image}: {output}")]
    ImagePull { image: String, output: String },

    #[error("raw error: {output}")]
    CommandFailed { status: i32, output: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}: db does not exist")]
    DatabaseNotExist(String),

    #[error("invalid boolean in query output: {0:?}")]
    InvalidBool(String),

    #[error("import failed at {step}: {error}")]
    Import {
        step: ImportStep,
        error: Box<PgDockError>,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PgDockError {
    /// True for the "database does not exist" outcome, however deeply it was wrapped.
    pub fn is_not_found(&self) -> bool {
        match self {
            PgDockError::DatabaseNotExist(_) => true,
            PgDockError::Import { error, .. } => error.is_not_found(),
            _ => false,
        }
    }

    /// The import step that failed, if this error came out of an import.
    pub fn failed_step(&self) -> Option<ImportStep> {
        match self {
            PgDockError::Import { step, .. } => Some(*step),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PgDockError>;

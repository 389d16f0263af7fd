pub mod bio;
pub mod cli;
pub mod core;
pub mod storage;
pub mod utils;

pub use crate::core::{config::Config, resolver::CrosswalkResolver};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaxbridgeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Parse error: {0}")]
    Parse(String),

    /// A sink chunk failed; chunks before it stay committed.
    #[error(
        "Persistence failed on chunk {chunk}/{total_chunks} ({committed} records already committed): {message}"
    )]
    Persistence {
        chunk: usize,
        total_chunks: usize,
        committed: usize,
        message: String,
    },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for TaxbridgeError {
    fn from(err: serde_json::Error) -> Self {
        TaxbridgeError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TaxbridgeError>;

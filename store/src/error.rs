use std::io;

use thiserror::Error;

/// Errors produced while loading, simulating or reporting on the store's data
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A data file could not be parsed. Lines are numbered from 1.
    #[error("line {line}: {reason}")]
    Parse {
        line: usize,
        reason: String,
    },

    #[error("invalid product: {0}")]
    InvalidProduct(&'static str),

    #[error("invalid supplier name {0:?}: a name needs at least two words")]
    InvalidSupplier(String),

    #[error("invalid value for {key}: {reason}")]
    Config {
        key: &'static str,
        reason: String,
    },

    #[error("could not read the environment file: {0}")]
    EnvFile(#[from] dotenvy::Error),

    #[error("no products have been loaded")]
    EmptyCatalog,

    #[error(transparent)]
    Container(#[from] assoc::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

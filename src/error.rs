use thiserror::Error;

/// Errors reported by the containers in this crate
///
/// Every fallible operation checks for the error condition before touching
/// the structure, so a returned error always means the container is exactly
/// as it was before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// No entry with the requested key exists
    #[error("key not found")]
    NotFound,
    /// An entry with the given key already exists
    #[error("key already present")]
    DuplicateKey,
    /// A container was configured with parameters it cannot work with
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),
    /// A positional insert was given an index past the end of the sequence
    #[error("index {index} out of bounds for length {len}")]
    OutOfBounds { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

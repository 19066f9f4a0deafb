use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Invalid limit: {0} (must be at least 1)")]
    InvalidLimit(usize),

    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Index misaligned with corpus: expected {expected} vectors, got {actual}")]
    IndexMisaligned { expected: usize, actual: usize },

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Model load error: {0}")]
    ModelLoad(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Errors caused by the request itself rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::EmptyInput(_) | Error::InvalidLimit(_))
    }
}

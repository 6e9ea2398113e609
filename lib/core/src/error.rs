use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Column not found in dataset: {0}")]
    InvalidColumn(String),

    #[error("Dataset has no rows")]
    EmptyDataset,

    #[error("Title not found in dataset: {0}")]
    TitleNotFound(String),

    #[error("Invalid weights: {0}")]
    InvalidWeights(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Feature row count mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Model has not been built yet")]
    ModelNotBuilt,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        let message = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(e) => Error::Io(e),
            _ => Error::Serialization(message),
        }
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SalesAnalyticsError {
    #[error("Failed to read source file '{path}': {source}")]
    SourceUnreadable {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("Malformed record in source file: {0}")]
    MalformedRecord(#[from] csv::Error),

    #[error("No transactions available for training")]
    EmptyDataset,

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SalesAnalyticsError>;

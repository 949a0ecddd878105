use thiserror::Error;

/// Fatal configuration errors, raised once at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("AZURE_STORAGE_ACCOUNT_NAME is not set")]
    MissingAccountName,

    #[error("Invalid storage endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
}

/// Error type for remote storage operations. Callers translate these into
/// response envelopes; nothing here is retried or escalated.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{operation} failed with status {status}: {message}")]
    Service {
        operation: &'static str,
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

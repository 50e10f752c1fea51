use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("GraphQL query {operation} returned errors: {errors}")]
    GraphQL { operation: String, errors: String },

    #[error("GraphQL response contained no data")]
    NoResponseData,

    #[error("Search response did not contain a total test count")]
    MissingTotal,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MigrateError {
    /// HTTP status of the failed response, when the failure came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response content for the error log.
    ///
    /// API failures carry the body the server sent back; everything else falls
    /// back to the error's own description.
    pub fn response_content(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MigrateError>;

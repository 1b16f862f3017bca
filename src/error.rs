use thiserror::Error;

/// Errors that can occur while talking to the recipe catalog service
#[derive(Error, Debug)]
pub enum RecipeError {
    /// The service answered but had no usable recipe or list
    #[error("The recipe service returned no recipes")]
    EmptyResult,

    /// The request never produced a response (unreachable host, timeout, TLS, ...)
    #[error("Failed to reach recipe service: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status code
    #[error("Recipe service responded with status {0}")]
    Status(reqwest::StatusCode),

    /// The response body was not valid JSON
    #[error("Malformed response body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}

/// The two failure classes a screen distinguishes when it shows an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// "Nothing found"
    EmptyResult,
    /// "Couldn't connect"
    TransportFailure,
}

impl RecipeError {
    pub fn kind(&self) -> FailureKind {
        match self {
            RecipeError::EmptyResult => FailureKind::EmptyResult,
            _ => FailureKind::TransportFailure,
        }
    }
}

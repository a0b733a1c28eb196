use std::result;

use thiserror::Error;

/// Error types for PubMed client operations
#[derive(Error, Debug)]
pub enum PubMedError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// XML response could not be parsed
    #[error("XML parsing failed: {0}")]
    XmlError(String),

    /// Endpoint answered with a non-success status
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },
}

pub type Result<T> = result::Result<T, PubMedError>;

impl PubMedError {
    /// Whether the failure happened at the HTTP layer rather than while
    /// handling a response body.
    ///
    /// The search path only retries transport failures; everything else
    /// there propagates or is downgraded (see `PubMedClient::search`).
    pub(crate) fn is_transport(&self) -> bool {
        matches!(
            self,
            PubMedError::RequestError(_) | PubMedError::ApiError { .. }
        )
    }
}

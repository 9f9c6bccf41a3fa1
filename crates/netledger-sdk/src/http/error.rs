/*
[INPUT]:  Error sources (local validation, network, server status, decoding)
[OUTPUT]: Structured error types callers can match on
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the ledger client
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Caller input rejected before any request was sent
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        parameter: Option<String>,
    },

    /// Timeout or network-level failure; the request may not have reached the server
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// Server answered with a non-2xx status
    #[error("API error (status {status}): {message}")]
    Api {
        status: u16,
        message: String,
        details: Option<String>,
    },

    /// Server answered 2xx without the data the operation requires
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A 2xx body did not match the expected shape
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Client construction error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LedgerError {
    pub fn validation(message: impl Into<String>, parameter: impl Into<String>) -> Self {
        LedgerError::Validation {
            message: message.into(),
            parameter: Some(parameter.into()),
        }
    }

    /// Create an API error from status code and message
    pub fn api_error(
        status: StatusCode,
        message: impl Into<String>,
        details: Option<String>,
    ) -> Self {
        LedgerError::Api {
            status: status.as_u16(),
            message: message.into(),
            details,
        }
    }

    pub fn timeout() -> Self {
        LedgerError::Connection {
            message: "Request timed out".to_string(),
            source: None,
        }
    }

    pub fn no_data() -> Self {
        LedgerError::InvalidResponse("No data returned from server".to_string())
    }

    /// Classify a reqwest failure raised while sending or reading a response.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::timeout();
        }
        LedgerError::Connection {
            message: "Failed to connect to the server".to_string(),
            source: Some(err),
        }
    }

    /// HTTP status for API errors
    pub fn status(&self) -> Option<u16> {
        match self {
            LedgerError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND.as_u16())
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED.as_u16())
    }

    /// 409: committed entry, broken chain, or similar state conflict
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(StatusCode::CONFLICT.as_u16())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, LedgerError::Validation { .. })
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, LedgerError::Connection { .. })
    }
}

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

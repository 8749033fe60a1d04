//! Error types for the upstream fetch path and for startup configuration.

use http::StatusCode;
use thiserror::Error;

/// Failure while talking to the upstream provider.
///
/// Every variant is caught at the HTTP boundary and turned into a 500 response;
/// none of them is ever collapsed into an empty post list.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network, DNS, TLS or timeout failure.
    #[error("upstream unavailable: {0}")]
    Unavailable(#[from] reqwest::Error),
    /// Provider answered with a non-success status.
    #[error("upstream rejected {endpoint} with status {status}")]
    Rejected {
        endpoint: String,
        status: StatusCode,
    },
    /// Success status but the body is not the expected envelope.
    #[error("malformed upstream envelope: {0}")]
    MalformedEnvelope(String),
    /// The provider kept returning a cursor past the configured page bound.
    #[error("pagination limit of {max_pages} pages exceeded")]
    PaginationLimitExceeded { max_pages: u32 },
}

impl FetchError {
    /// Only transport failures are worth retrying; a rejection will be rejected again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Unavailable(_))
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, FetchError::Rejected { status, .. } if *status == StatusCode::UNAUTHORIZED)
    }

    /// Short label used for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            FetchError::Unavailable(_) => "unavailable",
            FetchError::Rejected { .. } => "rejected",
            FetchError::MalformedEnvelope(_) => "malformed",
            FetchError::PaginationLimitExceeded { .. } => "pagination_limit",
        }
    }
}

/// Configuration problem detected before the server starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("required config value '{0}' is missing")]
    Missing(&'static str),
    #[error("invalid config: {0}")]
    Invalid(String),
}

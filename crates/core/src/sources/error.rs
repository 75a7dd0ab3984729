//! Errors from upstream weather and news services.

use thiserror::Error;

use crate::feed::FetchFailure;

#[derive(Debug, Error)]
pub enum NwsError {
    /// Transport failure from the HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status.
    #[error("API error ({status}) for {url}: {message}")]
    ApiError {
        status: u16,
        url: String,
        message: String,
    },

    /// Response body could not be decoded.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The points lookup did not return a URL the feed needs.
    #[error("NWS did not return a {0} URL for the configured coordinates")]
    MissingEndpoint(&'static str),

    /// Nothing to build a payload from (e.g. no observation stations).
    #[error("No data: {0}")]
    NoData(String),
}

impl NwsError {
    /// Whether retrying later could succeed. Client errors other than rate
    /// limiting are not expected to fix themselves.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::NoData(_) => true,
            Self::ApiError { status, .. } => *status >= 500 || *status == 429,
            Self::ParseError(_) | Self::MissingEndpoint(_) => false,
        }
    }
}

impl From<NwsError> for FetchFailure {
    fn from(err: NwsError) -> Self {
        match err {
            NwsError::Http(e) if e.is_timeout() => FetchFailure::network(format!("timeout: {}", e)),
            NwsError::Http(e) => FetchFailure::network(e.to_string()),
            NwsError::ApiError {
                status, message, ..
            } => FetchFailure::upstream(status, message),
            NwsError::ParseError(msg) => FetchFailure::parse(msg),
            other @ (NwsError::MissingEndpoint(_) | NwsError::NoData(_)) => {
                FetchFailure::parse(other.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        let err = NwsError::ApiError {
            status: 503,
            url: "https://api.weather.gov/alerts".to_string(),
            message: "unavailable".to_string(),
        };
        assert!(err.is_retryable());

        let err = NwsError::ApiError {
            status: 404,
            url: "https://api.weather.gov/points/0,0".to_string(),
            message: "not found".to_string(),
        };
        assert!(!err.is_retryable());
        assert!(!NwsError::MissingEndpoint("forecast").is_retryable());
    }

    #[test]
    fn test_into_fetch_failure() {
        let failure: FetchFailure = NwsError::ApiError {
            status: 500,
            url: "u".to_string(),
            message: "boom".to_string(),
        }
        .into();
        assert_eq!(failure.kind(), "upstream");

        let failure: FetchFailure = NwsError::ParseError("bad json".to_string()).into();
        assert_eq!(failure.kind(), "parse");

        let failure: FetchFailure = NwsError::MissingEndpoint("forecast").into();
        assert!(failure.to_string().contains("forecast"));
    }
}

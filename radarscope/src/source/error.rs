//! Error types for aircraft data sources.

use std::fmt;

use thiserror::Error;

/// Errors that can occur when fetching a snapshot from a data source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    /// The source answered with HTTP 429.
    #[error("Rate limited by data source")]
    RateLimited,

    /// Transport failure or unexpected HTTP status.
    #[error("Network error: {0}")]
    Network(String),

    /// The request did not complete within the client timeout.
    #[error("Request timed out")]
    Timeout,

    /// The response body could not be decoded.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The query radius exceeds what the source accepts.
    #[error("Radius {radius_nm}nm is out of range (max {max_nm}nm)")]
    RadiusOutOfRange { radius_nm: f64, max_nm: f64 },
}

impl SourceError {
    /// Display-level classification of this error.
    pub fn kind(&self) -> FeedErrorKind {
        match self {
            SourceError::RateLimited => FeedErrorKind::RateLimited,
            SourceError::Network(_) | SourceError::Timeout => FeedErrorKind::NetworkOrTimeout,
            SourceError::MalformedResponse(_) => FeedErrorKind::MalformedResponse,
            SourceError::RadiusOutOfRange { .. } => FeedErrorKind::OutOfRangeQuery,
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SourceError::Timeout
        } else if e.is_decode() {
            SourceError::MalformedResponse(e.to_string())
        } else {
            SourceError::Network(e.to_string())
        }
    }
}

/// Coarse error class surfaced to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedErrorKind {
    RateLimited,
    NetworkOrTimeout,
    MalformedResponse,
    OutOfRangeQuery,
}

impl fmt::Display for FeedErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FeedErrorKind::RateLimited => "rate limited",
            FeedErrorKind::NetworkOrTimeout => "network",
            FeedErrorKind::MalformedResponse => "malformed response",
            FeedErrorKind::OutOfRangeQuery => "out of range",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(SourceError::RateLimited.kind(), FeedErrorKind::RateLimited);
        assert_eq!(SourceError::Timeout.kind(), FeedErrorKind::NetworkOrTimeout);
        assert_eq!(
            SourceError::Network("refused".into()).kind(),
            FeedErrorKind::NetworkOrTimeout
        );
        assert_eq!(
            SourceError::MalformedResponse("eof".into()).kind(),
            FeedErrorKind::MalformedResponse
        );
        assert_eq!(
            SourceError::RadiusOutOfRange {
                radius_nm: 300.0,
                max_nm: 250.0
            }
            .kind(),
            FeedErrorKind::OutOfRangeQuery
        );
    }

    #[test]
    fn test_error_messages() {
        let err = SourceError::RadiusOutOfRange {
            radius_nm: 300.0,
            max_nm: 250.0,
        };
        assert_eq!(err.to_string(), "Radius 300nm is out of range (max 250nm)");
    }
}

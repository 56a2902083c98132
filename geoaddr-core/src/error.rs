use thiserror::Error;

/// Errors produced while looking up and normalizing an address
#[derive(Error, Debug)]
pub enum GeoError {
    /// A field the normalizer cannot do without is absent from the payload
    #[error("incomplete address: missing `{field}`")]
    IncompleteAddress { field: &'static str },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Provider answered with a non-2xx status
    #[error("upstream returned status {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    /// Request never produced a response (DNS, TLS, timeout, ...)
    #[error("upstream request failed: {0}")]
    UpstreamTransport(#[from] reqwest::Error),

    #[error("failed to decode JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no API key configured for {provider}")]
    MissingApiKey { provider: &'static str },

    /// Provider answered 2xx but the body carries an `error` message
    #[error("provider error: {0}")]
    ProviderMessage(String),

    #[error("no results for query `{query}`")]
    NoResults { query: String },

    #[error("{provider} does not support {operation}")]
    Unsupported {
        provider: &'static str,
        operation: &'static str,
    },

    #[error("unknown provider `{0}`")]
    UnknownProvider(String),
}

impl GeoError {
    /// True when the failure came from the HTTP exchange rather than the data
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            GeoError::UpstreamStatus { .. } | GeoError::UpstreamTransport(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, GeoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_grouping() {
        let status = GeoError::UpstreamStatus {
            status: 503,
            body: "busy".to_string(),
        };
        assert!(status.is_upstream());
        assert!(!GeoError::IncompleteAddress { field: "country_code" }.is_upstream());
        assert!(!GeoError::InvalidInput("x".to_string()).is_upstream());
    }

    #[test]
    fn test_messages() {
        let err = GeoError::IncompleteAddress { field: "country_code" };
        assert_eq!(err.to_string(), "incomplete address: missing `country_code`");

        let err = GeoError::Unsupported {
            provider: "LocationIQ",
            operation: "forward geocoding",
        };
        assert_eq!(err.to_string(), "LocationIQ does not support forward geocoding");
    }
}

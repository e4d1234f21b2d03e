use thiserror::Error;

/// Errors that can occur while talking to an upstream data provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network failure, timeout or undecodable body.
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The payload decoded but did not contain what we asked for.
    #[error("Unexpected response: {0}")]
    Response(String),

    /// The provider returned a rate outside sane bounds.
    #[error("Invalid exchange rate from {provider}: {rate}")]
    InvalidRate { provider: &'static str, rate: f64 },

    /// The client could not be built from the configured settings.
    #[error("Invalid provider configuration: {0}")]
    Config(String),
}

impl From<reqwest::header::InvalidHeaderValue> for ProviderError {
    fn from(e: reqwest::header::InvalidHeaderValue) -> Self {
        ProviderError::Config(format!("invalid header value: {}", e))
    }
}

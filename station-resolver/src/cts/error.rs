//! CTS client error types.

/// Errors from the CTS HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum CtsError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API rejected the token
    #[error("unauthorized: check CTS_TOKEN")]
    Unauthorized,

    /// Rate limited by the API
    #[error("rate limited by CTS API")]
    RateLimited,

    /// API returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// JSON deserialization failed
    #[error("JSON parse error: {message}{}", body_suffix(.body))]
    Json {
        message: String,
        body: Option<String>,
    },

    /// A stop monitoring response did not carry exactly one delivery
    #[error("expected exactly one stop monitoring delivery, got {0}")]
    UnexpectedDeliveryCount(usize),
}

fn body_suffix(body: &Option<String>) -> String {
    match body {
        Some(body) => format!(" (body: {body})"),
        None => String::new(),
    }
}

impl CtsError {
    /// Whether the feed broke its response contract.
    ///
    /// Contract violations abort a schedule query instead of being
    /// recorded as a per-stop failure.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, CtsError::UnexpectedDeliveryCount(_))
    }
}

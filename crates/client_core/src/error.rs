use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response (unreachable host, timeout, broken body).
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    /// The server answered but refused the operation.
    #[error(
        "{endpoint} rejected the request (status {}): {}",
        .status.map_or_else(|| "n/a".to_string(), |code| code.to_string()),
        .message.as_deref().unwrap_or("no message")
    )]
    Rejected {
        endpoint: &'static str,
        status: Option<u16>,
        message: Option<String>,
    },
    #[error("unexpected response from {endpoint}: {reason}")]
    Malformed {
        endpoint: &'static str,
        reason: String,
    },
    #[error("{0}")]
    Validation(String),
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ClientError {
    /// Text the server supplied for a refusal, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected {
                message: Some(message),
                ..
            } => Some(message.as_str()),
            _ => None,
        }
    }

    /// Message to show the user: the server's own words when it gave some,
    /// otherwise `fallback`.
    pub fn user_message<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self {
            Self::Validation(message) => message,
            _ => self.server_message().unwrap_or(fallback),
        }
    }
}

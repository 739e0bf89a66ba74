use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("bad request: {message}")]
    BadRequest { message: String },

    #[error("not found")]
    NotFound,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl ClientError {
    /// Transport failures and server-side errors may succeed on a second
    /// attempt; rejected input and missing events will not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::BadRequest { .. } | Self::NotFound => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_server_failures_are_retryable() {
        assert!(ClientError::Api {
            status: 503,
            message: String::new()
        }
        .is_retryable());
        assert!(!ClientError::Api {
            status: 409,
            message: String::new()
        }
        .is_retryable());
        assert!(!ClientError::NotFound.is_retryable());
        assert!(!ClientError::BadRequest {
            message: "invalid order".to_string()
        }
        .is_retryable());
    }
}

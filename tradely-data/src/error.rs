use thiserror::Error;

/// All errors generated in `tradely-data`.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum DataError {
    #[error("SocketError: {0}")]
    Socket(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("HTTP error status: {0}")]
    Status(u16),

    #[error("backend returned an error: {0}")]
    Api(String),

    #[error("failed to decode payload: {0}")]
    Decode(String),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("pin storage error: {0}")]
    Storage(String),
}

impl DataError {
    /// Determine if an error is worth surfacing with a retry action rather than as a hard failure.
    pub fn is_transient(&self) -> bool {
        match self {
            DataError::Socket(_) | DataError::Http(_) => true,
            DataError::Status(code) => *code >= 500,
            _ => false,
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for DataError {
    fn from(value: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Socket(value.to_string())
    }
}

impl From<reqwest::Error> for DataError {
    fn from(value: reqwest::Error) -> Self {
        match value.status() {
            Some(status) => Self::Status(status.as_u16()),
            None if value.is_decode() => Self::Decode(value.to_string()),
            None => Self::Http(value.to_string()),
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value.to_string())
    }
}

impl From<url::ParseError> for DataError {
    fn from(value: url::ParseError) -> Self {
        Self::Config(value.to_string())
    }
}

impl From<std::io::Error> for DataError {
    fn from(value: std::io::Error) -> Self {
        Self::Storage(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_error_is_transient() {
        struct TestCase {
            input: DataError,
            expected: bool,
        }

        let tests = vec![
            TestCase {
                // TC0: dropped subscription is transient
                input: DataError::Socket("WebSocket error: ConnectionClosed".to_string()),
                expected: true,
            },
            TestCase {
                // TC1: connect refused is transient
                input: DataError::Http("error sending request".to_string()),
                expected: true,
            },
            TestCase {
                // TC2: 503 is transient
                input: DataError::Status(503),
                expected: true,
            },
            TestCase {
                // TC3: 404 is not transient
                input: DataError::Status(404),
                expected: false,
            },
            TestCase {
                // TC4: local validation is not transient
                input: DataError::Validation("quantity must be at least 1".to_string()),
                expected: false,
            },
            TestCase {
                // TC5: malformed payload is not transient
                input: DataError::from(serde_json::from_str::<u32>("nope").unwrap_err()),
                expected: false,
            },
            TestCase {
                // TC6: socket drop reported by the subscription loop
                input: DataError::from(tokio_tungstenite::tungstenite::Error::ConnectionClosed),
                expected: true,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = test.input.is_transient();
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }
}

//! Management API errors.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArmError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("{code}: {message} (HTTP {status})")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// A name that cannot be used as a path segment (empty, `.` or `..`).
    #[error("invalid resource name '{0}'")]
    InvalidName(String),

    /// A long-running operation settled as `Failed` or `Canceled`.
    #[error("operation {status}: {code}: {message}")]
    OperationFailed {
        status: String,
        code: String,
        message: String,
    },

    #[error("operation did not complete within {0:?}")]
    Timeout(Duration),

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ArmError {
    pub fn api(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            code: code.into(),
            message: message.into(),
        }
    }
}

pub type ArmResult<T> = Result<T, ArmError>;

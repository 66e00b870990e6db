//! Errors returned by task stores

use thiserror::Error;

/// What can go wrong when talking to a [`TaskStore`](crate::traits::TaskStore)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A required field is empty or invalid. This is detected before any request is sent
    #[error("invalid input: {0}")]
    Validation(String),
    /// The remote store could not be reached, refused the request, or sent back garbage
    #[error("remote store error: {0}")]
    Remote(String),
    /// The targeted task does not exist (anymore)
    #[error("no such task: {0}")]
    NotFound(String),
}

impl StoreError {
    pub fn validation<M: Into<String>>(message: M) -> Self {
        Self::Validation(message.into())
    }

    pub fn remote<M: Into<String>>(message: M) -> Self {
        Self::Remote(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        Self::Remote(err.to_string())
    }
}

impl From<url::ParseError> for StoreError {
    fn from(err: url::ParseError) -> Self {
        Self::Remote(format!("invalid URL: {}", err))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Remote(format!("unexpected data: {}", err))
    }
}

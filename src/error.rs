use std::time::Duration;
use thiserror::Error;

/// The input could not be turned into a video id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid video URL {input:?}: {reason}")]
pub struct InvalidUrlError {
    pub input: String,
    pub reason: &'static str,
}

impl InvalidUrlError {
    pub fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("backend responded with HTTP {0}")]
    Status(u16),
    #[error("request to backend failed: {0}")]
    Transport(String),
    #[error("request to backend timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownloadError {
    #[error(transparent)]
    InvalidUrl(#[from] InvalidUrlError),
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

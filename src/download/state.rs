use crate::{
    backend::Receipt,
    error::DownloadError,
    video::{preview, PreviewDescriptor, VideoReference},
};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadState {
    #[default]
    Ready,
    Downloading,
    Finished,
    Error,
}

impl fmt::Display for DownloadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ready => "ready",
            Self::Downloading => "downloading",
            Self::Finished => "finished",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidUrl,
    Network,
    Unexpected,
}

/// Why the last download failed, in a form a front-end can show as is.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(dead_code)]
pub struct ErrorDetail {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&DownloadError> for ErrorDetail {
    fn from(error: &DownloadError) -> Self {
        let kind = match error {
            DownloadError::InvalidUrl(_) => ErrorKind::InvalidUrl,
            DownloadError::Network(_) => ErrorKind::Network,
            DownloadError::Unexpected(_) => ErrorKind::Unexpected,
        };
        Self {
            kind,
            message: error.to_string(),
        }
    }
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// The one job a controller owns. Only the controller task mutates it.
#[derive(Debug, Default)]
pub(super) struct DownloadJob {
    pub reference: VideoReference,
    pub metadata: Option<String>,
    pub state: DownloadState,
    pub error: Option<ErrorDetail>,
    pub receipt: Option<Receipt>,
    pub attempts: u32,
}

impl DownloadJob {
    pub fn set_metadata(&mut self, tag: &str) {
        self.metadata = if tag.is_empty() {
            None
        } else {
            Some(tag.to_string())
        };
    }

    /// Clears the outcome of the previous run. Input is left alone.
    pub fn clear_outcome(&mut self) {
        self.error = None;
        self.receipt = None;
    }

    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            state: self.state,
            error: self.error.clone(),
            receipt: self.receipt.clone(),
            raw_input: self.reference.raw_input().to_string(),
            metadata: self.metadata.clone(),
            preview: preview::resolve(self.reference.canonical_id()),
            attempts: self.attempts,
        }
    }
}

/// Read-only view of the job handed to whoever renders it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(dead_code)]
pub struct JobSnapshot {
    pub state: DownloadState,
    pub error: Option<ErrorDetail>,
    pub receipt: Option<Receipt>,
    pub raw_input: String,
    pub metadata: Option<String>,
    pub preview: Option<PreviewDescriptor>,
    /// Number of requests issued to the backend so far.
    pub attempts: u32,
}

mod controller;
mod state;

pub use controller::{ControllerOptions, DownloadController, StartOutcome};
pub use state::{DownloadState, ErrorDetail, ErrorKind, JobSnapshot};

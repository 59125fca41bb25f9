use super::state::{DownloadJob, DownloadState, ErrorDetail, JobSnapshot};
use crate::{
    backend::{DownloadBackend, Receipt},
    error::{DownloadError, InvalidUrlError, NetworkError},
};
use std::{sync::Arc, time::Duration};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A request was sent to the backend.
    Started,
    /// A request is already in flight; nothing was sent.
    AlreadyRunning,
}

#[derive(Debug, Clone, Default)]
pub struct ControllerOptions {
    /// Upper bound for a single backend request. `None` waits as long as the backend takes.
    pub request_timeout: Option<Duration>,
}

enum Command {
    SetUrl(String),
    SetMetadata(String),
    Start(oneshot::Sender<Result<StartOutcome, DownloadError>>),
    Reset,
}

type Outcome = Result<Receipt, DownloadError>;

/// Handle to the task that owns the download job.
///
/// All mutation goes through commands processed one at a time by that task, so there is at
/// most one backend request in flight. Cloning the handle is cheap; the task stops once every
/// handle is dropped.
#[derive(Clone)]
pub struct DownloadController {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<JobSnapshot>,
}

impl DownloadController {
    pub fn spawn(backend: Arc<dyn DownloadBackend>, options: ControllerOptions) -> Self {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
        let job = DownloadJob::default();
        let (snapshots_tx, snapshots_rx) = watch::channel(job.snapshot());

        info!("Download controller using {} backend", backend.name());

        let task = ControllerTask {
            backend,
            options,
            job,
            snapshots: snapshots_tx,
            outcomes: outcomes_tx,
        };
        tokio::spawn(task.run(commands_rx, outcomes_rx));

        Self {
            commands: commands_tx,
            snapshots: snapshots_rx,
        }
    }

    pub fn set_url(&self, raw_input: &str) -> Result<(), DownloadError> {
        self.send(Command::SetUrl(raw_input.to_string()))
    }

    pub fn set_metadata(&self, tag: &str) -> Result<(), DownloadError> {
        self.send(Command::SetMetadata(tag.to_string()))
    }

    /// Starts a download for whatever the current input resolves to.
    ///
    /// An unusable input is returned as [`DownloadError::InvalidUrl`] and leaves the state
    /// untouched. Network failures never show up here; they land in the job state.
    pub async fn start(&self) -> Result<StartOutcome, DownloadError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Start(reply_tx))?;
        reply_rx.await.map_err(|_| {
            DownloadError::Unexpected("download controller dropped the request".into())
        })?
    }

    pub fn reset(&self) -> Result<(), DownloadError> {
        self.send(Command::Reset)
    }

    pub fn subscribe(&self) -> watch::Receiver<JobSnapshot> {
        self.snapshots.clone()
    }

    pub fn snapshot(&self) -> JobSnapshot {
        self.snapshots.borrow().clone()
    }

    fn send(&self, command: Command) -> Result<(), DownloadError> {
        self.commands
            .send(command)
            .map_err(|_| DownloadError::Unexpected("download controller is not running".into()))
    }
}

struct ControllerTask {
    backend: Arc<dyn DownloadBackend>,
    options: ControllerOptions,
    job: DownloadJob,
    snapshots: watch::Sender<JobSnapshot>,
    outcomes: mpsc::UnboundedSender<Outcome>,
}

impl ControllerTask {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut outcomes: mpsc::UnboundedReceiver<Outcome>,
    ) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(outcome) = outcomes.recv() => self.handle_outcome(outcome),
            }
        }

        if self.job.state == DownloadState::Downloading {
            warn!("Download controller stopped while a request was in flight");
        }
        debug!("Download controller stopped");
    }

    fn handle_command(&mut self, command: Command) {
        let reply = match command {
            Command::SetUrl(raw_input) => {
                self.job.reference.set_raw_input(&raw_input);
                debug!(
                    video_id = ?self.job.reference.canonical_id(),
                    "Video URL changed"
                );
                None
            }
            Command::SetMetadata(tag) => {
                self.job.set_metadata(&tag);
                None
            }
            Command::Start(reply) => Some((reply, self.start())),
            Command::Reset => {
                self.reset();
                None
            }
        };

        // Publish before replying so the caller never sees a stale snapshot
        self.publish();
        if let Some((reply, result)) = reply {
            // The caller may have stopped waiting; the state already tells the story
            let _ = reply.send(result);
        }
    }

    fn start(&mut self) -> Result<StartOutcome, DownloadError> {
        if self.job.state == DownloadState::Downloading {
            debug!("Download already in progress, ignoring start");
            return Ok(StartOutcome::AlreadyRunning);
        }

        let video_id = match self.job.reference.canonical_id() {
            Some(video_id) => video_id.clone(),
            None => {
                // Re-run the extractor only to report why the input was rejected
                let e = crate::video::extract(self.job.reference.raw_input())
                    .err()
                    .unwrap_or_else(|| {
                        InvalidUrlError::new(self.job.reference.raw_input(), "no video id found")
                    });
                warn!("Refusing to start download: {}", e);
                return Err(e.into());
            }
        };

        self.job.clear_outcome();
        self.job.attempts += 1;
        self.transition(DownloadState::Downloading);
        info!(
            video_id = %video_id,
            metadata = ?self.job.metadata,
            attempt = self.job.attempts,
            "Starting download"
        );

        let backend = Arc::clone(&self.backend);
        let metadata = self.job.metadata.clone();
        let timeout = self.options.request_timeout;
        let request = tokio::spawn(async move {
            let request = backend.request_download(&video_id, metadata.as_deref());
            match timeout {
                Some(limit) => tokio::time::timeout(limit, request)
                    .await
                    .unwrap_or(Err(NetworkError::TimedOut(limit))),
                None => request.await,
            }
        });

        let outcomes = self.outcomes.clone();
        tokio::spawn(async move {
            let outcome = match request.await {
                Ok(result) => result.map_err(DownloadError::from),
                Err(e) => Err(DownloadError::Unexpected(format!(
                    "download task failed: {e}"
                ))),
            };
            // Fails only once the controller is gone, and then nobody is left to tell
            let _ = outcomes.send(outcome);
        });

        Ok(StartOutcome::Started)
    }

    fn handle_outcome(&mut self, outcome: Outcome) {
        if self.job.state != DownloadState::Downloading {
            error!(
                state = %self.job.state,
                "Received a download result with no request in flight"
            );
            return;
        }

        match outcome {
            Ok(receipt) => {
                info!("Download finished: {}", receipt);
                self.job.error = None;
                self.job.receipt = Some(receipt);
                self.transition(DownloadState::Finished);
            }
            Err(e) => {
                error!("Download failed: {}", e);
                self.job.receipt = None;
                self.job.error = Some(ErrorDetail::from(&e));
                self.transition(DownloadState::Error);
            }
        }
        self.publish();
    }

    fn reset(&mut self) {
        if self.job.state == DownloadState::Downloading {
            debug!("Cannot reset while a download is in flight");
            return;
        }
        self.job.clear_outcome();
        self.transition(DownloadState::Ready);
    }

    fn transition(&mut self, to: DownloadState) {
        if self.job.state != to {
            info!(from = %self.job.state, to = %to, "Download state changed");
        }
        self.job.state = to;
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.job.snapshot());
    }
}

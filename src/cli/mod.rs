mod status;

pub use status::describe;

use crate::{
    backend::DownloadBackend,
    download::{
        ControllerOptions, DownloadController, DownloadState, ErrorDetail, ErrorKind,
        JobSnapshot, StartOutcome,
    },
    video,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub fn extract(url: &str) -> Result<String> {
    let video_id = video::extract(url)?;
    Ok(video_id.to_string())
}

/// Preview descriptor as pretty JSON, `null` when the URL has no usable id.
pub fn preview(url: &str) -> Result<String> {
    let video_id = video::extract(url).ok();
    let descriptor = video::preview::resolve(video_id.as_ref());
    serde_json::to_string_pretty(&descriptor).context("Failed to serialize preview")
}

/// Only network failures are worth another attempt; anything else will fail the same way.
fn is_retryable(error: &ErrorDetail) -> bool {
    error.kind == ErrorKind::Network
}

/// Runs a download to completion, printing every state change. Failed network requests are
/// started again up to `retries` times.
pub async fn download(
    backend: Arc<dyn DownloadBackend>,
    options: ControllerOptions,
    url: &str,
    musicbrainz_id: Option<&str>,
    retries: u32,
) -> Result<JobSnapshot> {
    let controller = DownloadController::spawn(backend, options);
    let mut updates = controller.subscribe();

    controller.set_url(url)?;
    if let Some(tag) = musicbrainz_id {
        controller.set_metadata(tag)?;
    }

    let mut retries_left = retries;
    let mut last_state = None;
    loop {
        match controller.start().await? {
            StartOutcome::Started => {
                debug!(attempt = controller.snapshot().attempts, "Download request sent");
            }
            StartOutcome::AlreadyRunning => warn!("A download is already running, waiting for it"),
        }

        let snapshot = wait_until_settled(&mut updates, &mut last_state).await?;
        let retry = retries_left > 0 && snapshot.error.as_ref().is_some_and(is_retryable);
        if !retry {
            return Ok(snapshot);
        }

        retries_left -= 1;
        if let Some(error) = &snapshot.error {
            info!(retries_left, "Retrying download after: {}", error);
        }
        controller.reset()?;
    }
}

async fn wait_until_settled(
    updates: &mut watch::Receiver<JobSnapshot>,
    last_state: &mut Option<DownloadState>,
) -> Result<JobSnapshot> {
    loop {
        let snapshot = updates.borrow_and_update().clone();
        if *last_state != Some(snapshot.state) {
            println!("{}", describe(&snapshot));
            *last_state = Some(snapshot.state);
        }

        if matches!(
            snapshot.state,
            DownloadState::Finished | DownloadState::Error
        ) {
            info!(state = %snapshot.state, attempts = snapshot.attempts, "Download settled");
            return Ok(snapshot);
        }

        updates
            .changed()
            .await
            .context("Download controller stopped unexpectedly")?;
    }
}

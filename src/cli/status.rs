use crate::download::{DownloadState, JobSnapshot};

/// One line of text describing where the job is at.
pub fn describe(snapshot: &JobSnapshot) -> String {
    match snapshot.state {
        DownloadState::Ready => "Ready to download.".to_string(),
        DownloadState::Downloading => match &snapshot.preview {
            Some(preview) => format!("Downloading {}...", preview.video_id),
            None => "Downloading...".to_string(),
        },
        DownloadState::Finished => match &snapshot.receipt {
            Some(receipt) if !receipt.as_str().trim().is_empty() => {
                format!("Download complete. Server says: {}", receipt.as_str().trim())
            }
            _ => "Download complete.".to_string(),
        },
        DownloadState::Error => match &snapshot.error {
            Some(error) => format!("Download failed. Please try again. ({error})"),
            None => "Download failed. Please try again.".to_string(),
        },
    }
}

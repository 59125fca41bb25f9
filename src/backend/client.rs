use super::types::Receipt;
use crate::{error::NetworkError, video::VideoId};
use async_trait::async_trait;

#[async_trait]
pub trait DownloadBackend: Send + Sync {
    /// Human-readable name of the backend
    fn name(&self) -> &'static str;

    /// Ask the backend to fetch and convert one video. Exactly one request per call,
    /// no retries.
    async fn request_download(
        &self,
        video_id: &VideoId,
        metadata: Option<&str>,
    ) -> Result<Receipt, NetworkError>;
}

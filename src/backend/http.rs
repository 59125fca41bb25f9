use super::{client::DownloadBackend, types::Receipt};
use crate::{error::NetworkError, video::VideoId};
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info, warn};
use url::Url;

/// Talks to the audio backend over plain HTTP.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: Url) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Self::with_client(base_url, client)
    }

    pub fn with_client(base_url: Url, client: reqwest::Client) -> Result<Self> {
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(anyhow::anyhow!(
                "Backend URL must be an absolute http(s) URL, got {}",
                base_url
            ));
        }

        info!("Using audio backend at {}", base_url);
        Ok(Self { client, base_url })
    }

    /// `{base}/download?id=..&musicbrainzid=..`, keeping any path prefix of the base URL.
    pub fn download_url(&self, video_id: &VideoId, metadata: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        // Checked in the constructor
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("download");
        }
        url.query_pairs_mut()
            .clear()
            .append_pair("id", video_id.as_str())
            .append_pair("musicbrainzid", metadata.unwrap_or(""));
        url
    }
}

#[async_trait]
impl DownloadBackend for HttpBackend {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn request_download(
        &self,
        video_id: &VideoId,
        metadata: Option<&str>,
    ) -> Result<Receipt, NetworkError> {
        let url = self.download_url(video_id, metadata);
        debug!("Requesting download: {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!("Backend request failed: {}", e);
            NetworkError::Transport(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Backend responded with {}", status);
            return Err(NetworkError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| NetworkError::Transport(e.to_string()))?;
        debug!("Backend receipt: {}", body);

        Ok(Receipt::new(body))
    }
}

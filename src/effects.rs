use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::domain::CTError;

pub const CHANNEL_BASE_URL: &str = "https://www.youtube.com/channel/";

/// The external side effect behind "mark as viewed". Completing without an
/// error counts as success.
#[async_trait]
pub trait MarkViewed: Send + Sync {
    async fn mark_viewed(&self, channel_id: &str) -> Result<(), CTError>;
}

#[derive(Debug, Serialize)]
struct MarkViewedRequest<'a> {
    channel_id: &'a str,
}

/// Tells the server through `POST {base}/mark-as-viewed`.
pub struct ServerMarker {
    http_client: reqwest::Client,
    endpoint: Url,
}

impl ServerMarker {
    pub fn new(base_path: &str) -> Result<Self, CTError> {
        let endpoint = Url::parse(&format!(
            "{}/mark-as-viewed",
            base_path.trim_end_matches('/')
        ))?;
        Ok(Self {
            http_client: reqwest::Client::new(),
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl MarkViewed for ServerMarker {
    async fn mark_viewed(&self, channel_id: &str) -> Result<(), CTError> {
        let response = self
            .http_client
            .post(self.endpoint.clone())
            .json(&MarkViewedRequest { channel_id })
            .send()
            .await?;
        if !response.status().is_success() {
            warn!(
                "{} answered {} for channel {}",
                self.endpoint,
                response.status(),
                channel_id
            );
        }
        Ok(())
    }
}

/// Opens the channel page in the browser of the logged in account and waits a
/// fixed delay. Only works for the account signed in on that browser.
pub struct ChannelVisitor {
    settle: Duration,
}

impl ChannelVisitor {
    pub fn new(settle: Duration) -> Self {
        Self { settle }
    }

    pub fn channel_url(channel_id: &str) -> String {
        format!("{CHANNEL_BASE_URL}{channel_id}")
    }
}

#[async_trait]
impl MarkViewed for ChannelVisitor {
    async fn mark_viewed(&self, channel_id: &str) -> Result<(), CTError> {
        let url = ChannelVisitor::channel_url(channel_id);
        debug!("Visiting {url}");
        tokio::task::spawn_blocking(move || open::that(url))
            .await
            .map_err(|e| CTError::EffectFailed(e.to_string()))??;
        tokio::time::sleep(self.settle).await;
        Ok(())
    }
}

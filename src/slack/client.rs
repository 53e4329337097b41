//! Authenticated Slack Web API client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::Config;
use crate::slack::types::Message;
use crate::source::{MediaDownloadError, MediaDownloader, ThreadFetchError, ThreadSource};

const USER_AGENT: &str = concat!("slack-thread-archiver/", env!("CARGO_PKG_VERSION"));

/// Messages per `conversations.replies` page.
const PAGE_LIMIT: &str = "200";

/// Bearer-token client for the Web API and `url_private` file downloads.
///
/// File URLs live on a different host than the API but accept the same
/// token, so one client covers both capabilities.
pub struct SlackClient {
    http: Client,
    token: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct RepliesResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    messages: Vec<Message>,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: Option<String>,
}

impl SlackClient {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            token: config.token.clone(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ThreadSource for SlackClient {
    /// Page through `conversations.replies` until the cursor runs out,
    /// appending pages in order.
    async fn fetch_replies(
        &self,
        channel_id: &str,
        thread_ts: &str,
    ) -> Result<Vec<Message>, ThreadFetchError> {
        let mut messages = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut params = vec![
                ("channel", channel_id.to_string()),
                ("ts", thread_ts.to_string()),
                ("limit", PAGE_LIMIT.to_string()),
            ];
            if let Some(c) = &cursor {
                params.push(("cursor", c.clone()));
            }

            let response = self
                .http
                .get(format!("{}/conversations.replies", self.base_url))
                .bearer_auth(&self.token)
                .query(&params)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(ThreadFetchError::Status(status));
            }

            let page: RepliesResponse = response.json().await?;
            if !page.ok {
                return Err(ThreadFetchError::Api(
                    page.error.unwrap_or_else(|| "unknown error".to_string()),
                ));
            }

            debug!(count = page.messages.len(), "Fetched replies page");
            messages.extend(page.messages);

            cursor = page
                .response_metadata
                .and_then(|meta| meta.next_cursor)
                .filter(|c| !c.is_empty());
            if cursor.is_none() {
                break;
            }
        }

        Ok(messages)
    }
}

#[async_trait]
impl MediaDownloader for SlackClient {
    async fn download(&self, url: &str) -> Result<Vec<u8>, MediaDownloadError> {
        let response = self.http.get(url).bearer_auth(&self.token).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MediaDownloadError::Status(status));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

//! HTTP implementation of [`ReplyService`].
//!
//! Talks to `POST <backend_url>/chat` with a JSON body of the user's
//! message and the flattened history.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::reply::{parse_reply_body, ChatRequest, Reply, ReplyError, ReplyService};

/// Reply service backed by the remote companion HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpReplyClient {
    client: Client,
    endpoint: String,
}

impl HttpReplyClient {
    /// Create a client for the endpoint described by `config`.
    pub fn new(config: &Config) -> Result<Self, ReplyError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ReplyError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.chat_endpoint(),
        })
    }

    /// The full `/chat` URL this client posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send_request(&self, body: &ChatRequest) -> Result<Reply, ReplyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| ReplyError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReplyError::Status(status.as_u16()));
        }

        let text = response
            .text()
            .await
            .map_err(|err| ReplyError::Network(format!("failed to read response body: {err}")))?;

        parse_reply_body(&text)
    }
}

#[async_trait]
impl ReplyService for HttpReplyClient {
    async fn reply(&self, message: &str, history: &[String]) -> Result<Reply, ReplyError> {
        let request = ChatRequest {
            message: message.to_string(),
            history: history.to_vec(),
        };

        debug!(
            endpoint = %self.endpoint,
            history_len = request.history.len(),
            "sending chat request"
        );

        let result = self.send_request(&request).await;
        if let Err(err) = &result {
            warn!(endpoint = %self.endpoint, error = %err, "chat request failed");
        }
        result
    }
}

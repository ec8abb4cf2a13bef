//! Chat API service

use async_trait::async_trait;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use super::client::HttpClient;
use super::types::{ChatRequest, ChatResponse, HealthStatus};
use crate::config::endpoints;
use crate::error::ChatResult;
use crate::stream::{EventStream, SseEventStream};

/// Backend seam for chat exchanges.
///
/// `stream_message` returns decoded events rather than raw bytes so the
/// engine can be exercised against scripted event sequences in tests.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Perform a non-streaming exchange
    async fn send_message(&self, request: &ChatRequest) -> ChatResult<ChatResponse>;

    /// Open a streaming exchange; the token stops decoding at the next read
    async fn stream_message(
        &self,
        request: &ChatRequest,
        cancel: CancellationToken,
    ) -> ChatResult<EventStream>;
}

/// Chat API service backed by the HTTP transport
#[derive(Debug, Clone)]
pub struct ChatApi {
    http: HttpClient,
}

impl ChatApi {
    /// Create a chat API over the given transport
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Probe backend health
    pub async fn health_check(&self) -> ChatResult<HealthStatus> {
        self.http.get_json(endpoints::HEALTH).await
    }
}

#[async_trait]
impl ChatBackend for ChatApi {
    async fn send_message(&self, request: &ChatRequest) -> ChatResult<ChatResponse> {
        self.http.post_json(endpoints::CHAT, request).await
    }

    async fn stream_message(
        &self,
        request: &ChatRequest,
        cancel: CancellationToken,
    ) -> ChatResult<EventStream> {
        let bytes = self.http.stream(endpoints::CHAT_STREAM, request).await?;
        let events = SseEventStream::new(bytes.boxed(), cancel);
        Ok(Box::pin(events))
    }
}

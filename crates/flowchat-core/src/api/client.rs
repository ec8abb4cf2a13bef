//! Bounded-time HTTP transport client
//!
//! Thin wrapper over `reqwest` that classifies every failure at the boundary:
//! the engine above never sees a raw transport error. No retries happen here;
//! retry policy, if any, is a caller concern.

use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ApiConfig;
use crate::error::{ChatError, ChatResult};

/// HTTP client with a bounded wait on non-streaming requests
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    config: ApiConfig,
}

impl HttpClient {
    /// Create a client for the given configuration
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// The configuration this client was built with
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// POST a JSON body and decode a JSON response
    pub async fn post_json<B, T>(&self, endpoint: &str, body: &B) -> ChatResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.client.post(self.config.url(endpoint)).json(body);
        let response = self.send_checked(request).await?;
        decode_body(response).await
    }

    /// POST with query parameters and an empty body, decoding a JSON response
    pub async fn post_query<T>(&self, endpoint: &str, query: &[(&str, &str)]) -> ChatResult<T>
    where
        T: DeserializeOwned,
    {
        let request = self.client.post(self.config.url(endpoint)).query(query);
        let response = self.send_checked(request).await?;
        decode_body(response).await
    }

    /// GET a JSON response
    pub async fn get_json<T>(&self, endpoint: &str) -> ChatResult<T>
    where
        T: DeserializeOwned,
    {
        let request = self.client.get(self.config.url(endpoint));
        let response = self.send_checked(request).await?;
        decode_body(response).await
    }

    /// DELETE, discarding the response body
    pub async fn delete(&self, endpoint: &str) -> ChatResult<()> {
        let request = self.client.delete(self.config.url(endpoint));
        self.send_checked(request).await?;
        Ok(())
    }

    /// POST a JSON body and return the raw byte frames of the response.
    ///
    /// The bounded wait does not apply here; a streaming run is stopped by
    /// its cancellation token instead.
    pub async fn stream<B>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ChatResult<impl Stream<Item = ChatResult<Bytes>>>
    where
        B: Serialize + ?Sized,
    {
        let response = self
            .client
            .post(self.config.url(endpoint))
            .header(ACCEPT, "text/event-stream")
            .json(body)
            .send()
            .await
            .map_err(|error| classify_request_error(error, self.config.timeout.as_secs()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(crate::error::classify_http_failure(status.as_u16(), body));
        }

        Ok(response
            .bytes_stream()
            .map_err(|error| ChatError::stream(error.to_string())))
    }

    /// Send with the bounded wait and reject non-success statuses
    async fn send_checked(&self, request: reqwest::RequestBuilder) -> ChatResult<reqwest::Response> {
        let seconds = self.config.timeout.as_secs();
        let response = tokio::time::timeout(self.config.timeout, request.send())
            .await
            .map_err(|_| ChatError::Timeout { seconds })?
            .map_err(|error| classify_request_error(error, seconds))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(crate::error::classify_http_failure(status.as_u16(), body));
        }

        Ok(response)
    }
}

async fn decode_body<T: DeserializeOwned>(response: reqwest::Response) -> ChatResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|error| ChatError::other(format!("invalid response body: {}", error)))
}

fn classify_request_error(error: reqwest::Error, seconds: u64) -> ChatError {
    if error.is_timeout() {
        ChatError::Timeout { seconds }
    } else {
        ChatError::network(error.to_string())
    }
}

//! Session API service

use async_trait::async_trait;

use super::client::HttpClient;
use super::types::{SessionData, SessionResponse};
use crate::config::endpoints;
use crate::error::ChatResult;

/// Backend seam for session lifecycle calls
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Request a new session for the given user identifier
    async fn create_session(&self, user_identifier: &str) -> ChatResult<SessionResponse>;

    /// Fetch the record for an existing session
    async fn get_session(&self, session_id: &str) -> ChatResult<SessionData>;

    /// Delete a session and all its conversations
    async fn delete_session(&self, session_id: &str) -> ChatResult<()>;
}

/// Session API service backed by the HTTP transport
#[derive(Debug, Clone)]
pub struct SessionApi {
    http: HttpClient,
}

impl SessionApi {
    /// Create a session API over the given transport
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl SessionBackend for SessionApi {
    async fn create_session(&self, user_identifier: &str) -> ChatResult<SessionResponse> {
        self.http
            .post_query(endpoints::SESSIONS, &[("user_identifier", user_identifier)])
            .await
    }

    async fn get_session(&self, session_id: &str) -> ChatResult<SessionData> {
        self.http.get_json(&endpoints::session(session_id)).await
    }

    async fn delete_session(&self, session_id: &str) -> ChatResult<()> {
        self.http.delete(&endpoints::session(session_id)).await
    }
}

//! API configuration and endpoint definitions

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default bounded wait for non-streaming requests (30 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default backend base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8001";

/// Maximum conversation title length before truncation
pub const TITLE_MAX_LENGTH: usize = 50;

/// Configuration for the transport client
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the assistant backend, without a trailing slash
    pub base_url: String,
    /// Bounded wait applied to non-streaming requests
    pub timeout: Duration,
}

impl ApiConfig {
    /// Create a config for the given base URL with the default timeout
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the bounded wait
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build an absolute URL for an endpoint path
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Backend endpoint paths
pub mod endpoints {
    /// Non-streaming chat exchange
    pub const CHAT: &str = "/api/v1/chat";
    /// Streaming chat exchange (text/event-stream body)
    pub const CHAT_STREAM: &str = "/api/v1/chat/stream";
    /// Session creation
    pub const SESSIONS: &str = "/api/v1/sessions";
    /// Backend health probe
    pub const HEALTH: &str = "/api/v1/health";

    /// Session record lookup / deletion
    pub fn session(session_id: &str) -> String {
        format!("{}/{}", SESSIONS, session_id)
    }

    /// Workflow specification lookup
    pub fn workflow(spec_id: &str) -> String {
        format!("/api/v1/workflows/{}", spec_id)
    }
}

/// Language tag sent with every chat request.
///
/// Only the wire tag crosses the core boundary; translation content is the
/// presentation layer's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "es")]
    Spanish,
}

impl Language {
    /// The wire tag for this language
    pub fn tag(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = ApiConfig::new("http://localhost:8001/");
        assert_eq!(config.base_url, "http://localhost:8001");
        assert_eq!(config.url(endpoints::CHAT), "http://localhost:8001/api/v1/chat");
    }

    #[test]
    fn test_default_timeout() {
        assert_eq!(ApiConfig::default().timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_session_endpoint() {
        assert_eq!(endpoints::session("s-1"), "/api/v1/sessions/s-1");
    }

    #[test]
    fn test_language_tag_serialization() {
        assert_eq!(serde_json::to_string(&Language::English).unwrap(), "\"en\"");
        assert_eq!(serde_json::to_string(&Language::Spanish).unwrap(), "\"es\"");
    }
}

//! Error classification into the closed taxonomy

use std::fmt;

use super::types::ChatError;

/// Closed taxonomy of failure kinds.
///
/// Every [`ChatError`] reduces to exactly one kind via [`ChatError::kind`];
/// consumers can match on this without ever seeing transport internals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connection failure
    Network,
    /// Bounded wait elapsed
    Timeout,
    /// Non-success HTTP status
    Http(u16),
    /// Streamed body failed mid-flight
    Stream,
    /// Stream ended without a start event
    StreamStartFailed,
    /// The session id is no longer recognized server-side
    SessionInvalid,
    /// Everything else
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Network => write!(f, "network"),
            ErrorKind::Timeout => write!(f, "timeout"),
            ErrorKind::Http(status) => write!(f, "http:{}", status),
            ErrorKind::Stream => write!(f, "stream"),
            ErrorKind::StreamStartFailed => write!(f, "stream-start-failed"),
            ErrorKind::SessionInvalid => write!(f, "session-invalid"),
            ErrorKind::Unknown => write!(f, "unknown"),
        }
    }
}

impl ChatError {
    /// Classify this error into the closed taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChatError::Network { .. } => ErrorKind::Network,
            ChatError::Timeout { .. } => ErrorKind::Timeout,
            ChatError::Http { status, .. } => ErrorKind::Http(*status),
            ChatError::Stream { .. } => ErrorKind::Stream,
            ChatError::StreamStartFailed => ErrorKind::StreamStartFailed,
            ChatError::SessionInvalid { .. } => ErrorKind::SessionInvalid,
            ChatError::Cancelled | ChatError::Storage { .. } | ChatError::Other { .. } => {
                ErrorKind::Unknown
            }
        }
    }
}

/// Detect a 404-shaped failure whose body indicates the session is unknown.
///
/// The server reports an expired or deleted session as a plain 404 with a
/// detail string; surfacing it as `SessionInvalid` lets the UI show a more
/// actionable message than the generic templates.
pub(crate) fn classify_http_failure(status: u16, body: String) -> ChatError {
    if status == 404 {
        let body_lower = body.to_lowercase();
        if body_lower.contains("session") && body_lower.contains("not found") {
            return ChatError::SessionInvalid { message: body };
        }
    }
    ChatError::Http {
        status,
        message: body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_variant_has_a_kind() {
        assert_eq!(ChatError::network("x").kind(), ErrorKind::Network);
        assert_eq!(ChatError::Timeout { seconds: 30 }.kind(), ErrorKind::Timeout);
        assert_eq!(
            ChatError::Http {
                status: 503,
                message: String::new()
            }
            .kind(),
            ErrorKind::Http(503)
        );
        assert_eq!(ChatError::stream("x").kind(), ErrorKind::Stream);
        assert_eq!(ChatError::StreamStartFailed.kind(), ErrorKind::StreamStartFailed);
        assert_eq!(
            ChatError::SessionInvalid {
                message: String::new()
            }
            .kind(),
            ErrorKind::SessionInvalid
        );
        assert_eq!(ChatError::Cancelled.kind(), ErrorKind::Unknown);
        assert_eq!(ChatError::other("x").kind(), ErrorKind::Unknown);
    }

    #[test]
    fn test_session_invalid_from_404_body() {
        let err = classify_http_failure(404, "Session conv-1 not found".to_string());
        assert_eq!(err.kind(), ErrorKind::SessionInvalid);
    }

    #[test]
    fn test_plain_404_stays_http() {
        let err = classify_http_failure(404, "No such route".to_string());
        assert_eq!(err.kind(), ErrorKind::Http(404));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(format!("{}", ErrorKind::Network), "network");
        assert_eq!(format!("{}", ErrorKind::Http(500)), "http:500");
        assert_eq!(format!("{}", ErrorKind::StreamStartFailed), "stream-start-failed");
    }
}

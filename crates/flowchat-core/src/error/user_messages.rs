//! Localized, user-displayable error messages
//!
//! The reconciler never surfaces raw error text to the UI; every classified
//! error is reduced to one template from the active bundle. The mapping is
//! total: unmapped kinds fall back to the generic template.

use super::classifiers::ErrorKind;
use super::types::ChatError;

/// Bundle of localized message templates, one per user-visible failure shape.
#[derive(Debug, Clone)]
pub struct ErrorMessages {
    /// Connection-level failures
    pub network_error: String,
    /// Bounded wait elapsed
    pub timeout: String,
    /// The assistant endpoint does not exist (404)
    pub service_unavailable: String,
    /// The assistant endpoint is failing (>= 500)
    pub server_error: String,
    /// The streamed response broke down
    pub stream_error: String,
    /// The session id was rejected server-side
    pub session_expired: String,
    /// Fallback for everything else
    pub generic_error: String,
}

impl ErrorMessages {
    /// English template bundle
    pub fn english() -> Self {
        Self {
            network_error: "Unable to connect to AI assistant. Please check your connection."
                .to_string(),
            timeout: "Request timed out. Please try again.".to_string(),
            service_unavailable: "AI assistant service not available.".to_string(),
            server_error: "AI assistant is temporarily unavailable.".to_string(),
            stream_error: "The response stream was interrupted. Please try again.".to_string(),
            session_expired: "Your session has expired. Refresh to get a new session.".to_string(),
            generic_error: "Failed to send message. Please try again.".to_string(),
        }
    }

    /// Spanish template bundle
    pub fn spanish() -> Self {
        Self {
            network_error: "No se puede conectar al asistente IA. Por favor verifica tu conexión."
                .to_string(),
            timeout: "Se agotó el tiempo de espera. Por favor intenta de nuevo.".to_string(),
            service_unavailable: "El servicio del asistente IA no está disponible.".to_string(),
            server_error: "El asistente IA no está disponible temporalmente.".to_string(),
            stream_error: "La transmisión de la respuesta se interrumpió. Por favor intenta de nuevo."
                .to_string(),
            session_expired: "Tu sesión ha expirado. Actualiza para obtener una nueva sesión."
                .to_string(),
            generic_error: "Error al enviar el mensaje. Por favor intenta de nuevo.".to_string(),
        }
    }

    /// Reduce a classified error to one human-readable string.
    ///
    /// For HTTP failures the status selects the template: 404 means the
    /// service itself is missing, 5xx that it is failing; anything else gets
    /// the generic template.
    pub fn message_for(&self, error: &ChatError) -> String {
        match error.kind() {
            ErrorKind::Network => self.network_error.clone(),
            ErrorKind::Timeout => self.timeout.clone(),
            ErrorKind::Http(404) => self.service_unavailable.clone(),
            ErrorKind::Http(status) if status >= 500 => self.server_error.clone(),
            ErrorKind::Http(_) => self.generic_error.clone(),
            ErrorKind::Stream | ErrorKind::StreamStartFailed => self.stream_error.clone(),
            ErrorKind::SessionInvalid => self.session_expired.clone(),
            ErrorKind::Unknown => self.generic_error.clone(),
        }
    }
}

impl Default for ErrorMessages {
    fn default() -> Self {
        Self::english()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_is_total() {
        let messages = ErrorMessages::english();
        let errors = vec![
            ChatError::network("refused"),
            ChatError::Timeout { seconds: 30 },
            ChatError::Http {
                status: 404,
                message: String::new(),
            },
            ChatError::Http {
                status: 503,
                message: String::new(),
            },
            ChatError::Http {
                status: 422,
                message: String::new(),
            },
            ChatError::stream("broken"),
            ChatError::StreamStartFailed,
            ChatError::SessionInvalid {
                message: String::new(),
            },
            ChatError::Cancelled,
            ChatError::storage("disk"),
            ChatError::other("?"),
        ];
        for error in &errors {
            assert!(!messages.message_for(error).is_empty());
        }
    }

    #[test]
    fn test_http_status_selects_template() {
        let messages = ErrorMessages::english();
        let not_found = ChatError::Http {
            status: 404,
            message: String::new(),
        };
        let server = ChatError::Http {
            status: 500,
            message: String::new(),
        };
        assert_eq!(messages.message_for(&not_found), messages.service_unavailable);
        assert_eq!(messages.message_for(&server), messages.server_error);
    }

    #[test]
    fn test_timeout_template() {
        let messages = ErrorMessages::english();
        assert_eq!(
            messages.message_for(&ChatError::Timeout { seconds: 30 }),
            messages.timeout
        );
    }

    #[test]
    fn test_session_invalid_is_actionable() {
        let messages = ErrorMessages::english();
        let err = ChatError::SessionInvalid {
            message: "Session not found".to_string(),
        };
        assert!(messages.message_for(&err).contains("Refresh"));
    }

    #[test]
    fn test_spanish_bundle() {
        let messages = ErrorMessages::spanish();
        assert!(messages.message_for(&ChatError::network("x")).contains("conectar"));
    }
}

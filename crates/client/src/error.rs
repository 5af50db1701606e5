use edulearn_core::error::CoreError;
use edulearn_core::types::EntityId;

/// Errors surfaced to the presentation layer.
///
/// None of these are fatal; the caller decides whether to retry or show
/// the message inline.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A validation or gating error from `edulearn_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The HTTP request itself failed (network, DNS, TLS, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("EduLearn API error ({status}): {detail}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// The server's `detail` message, or the raw body.
        detail: String,
    },

    /// The current user has no enrollment for the course.
    #[error("Not enrolled in course {course_id}")]
    NotEnrolled { course_id: EntityId },

    /// The local progress does not yet qualify for a certificate.
    #[error("Certificate available after course completion ({percent}% complete)")]
    CertificateNotReady { percent: u8 },

    /// Configuration could not be loaded from the environment.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A local file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be encoded as JSON.
    #[error("JSON encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ClientError {
    /// Whether the server rejected the session token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Upstream { status: 401, .. })
    }
}

/// Convenience alias for client results.
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn io_failure_is_not_reported_as_config() {
        let err: ClientError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into();
        assert_matches!(err, ClientError::Io(_));
        assert!(err.to_string().starts_with("I/O error"));
    }

    #[test]
    fn json_failure_maps_to_encode() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ClientError::from(source);
        assert_matches!(err, ClientError::Encode(_));
    }

    #[test]
    fn only_401_is_unauthorized() {
        let unauthorized = ClientError::Upstream {
            status: 401,
            detail: "Could not validate credentials".to_string(),
        };
        let forbidden = ClientError::Upstream {
            status: 403,
            detail: "Cannot update this enrollment".to_string(),
        };
        assert!(unauthorized.is_unauthorized());
        assert!(!forbidden.is_unauthorized());
    }
}

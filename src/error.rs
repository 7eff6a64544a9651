//! Error types for the StreamFlix client.
//!
//! Two layers:
//! - [`ApiError`] describes what went wrong on the wire (status + server detail,
//!   timeout, transport, decoding).
//! - [`SessionError`] is what the session core surfaces to the presentation
//!   layer. Every failure resolves to one of these kinds; none of them is fatal.

use thiserror::Error;

/// Failure of a single boundary call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The server answered with a non-success status.
    /// `message` is the server's `detail` verbatim (or the raw body).
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Connection-level failure (DNS, refused, reset, TLS).
    #[error("network error: {0}")]
    Network(String),

    /// The response body did not match the expected shape.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether the server refused the bearer token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Rejected { status: 401 | 403, .. })
    }

    /// 4xx other than an auth refusal: the request itself was not acceptable.
    pub fn is_client_rejection(&self) -> bool {
        matches!(self, Self::Rejected { status, .. } if (400..500).contains(status))
            && !self.is_unauthorized()
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Result type for boundary calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Failure kinds surfaced by the session core.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// Bad credentials or refused registration. Session state is unchanged.
    #[error("{0}")]
    AuthRejected(String),

    /// A token exists but could not be resolved to an identity.
    /// The token has been erased and the session is unauthenticated.
    #[error("session is no longer valid: {0}")]
    SessionInvalid(String),

    /// A local admission check (or the server) refused the operation.
    #[error("{0}")]
    ValidationRejected(String),

    /// Any other boundary failure. Nothing was applied; the caller may retry.
    #[error("request failed: {0}")]
    Transient(String),

    /// The operation requires a signed-in identity.
    #[error("not signed in")]
    NotAuthenticated,

    /// The operation requires an active profile.
    #[error("no profile selected")]
    NoActiveProfile,

    /// The session changed while the request was in flight; its result was dropped.
    #[error("session changed while the request was in flight")]
    Superseded,
}

impl SessionError {
    /// Map a login/register failure: any client rejection is an auth refusal.
    pub(crate) fn from_credentials(err: ApiError) -> Self {
        match err {
            ApiError::Rejected { status, message } if (400..500).contains(&status) => {
                Self::AuthRejected(message)
            }
            other => Self::Transient(other.to_string()),
        }
    }

    /// Map a failure of an authenticated call that is not an auth refusal.
    pub(crate) fn from_request(err: ApiError) -> Self {
        if err.is_unauthorized() {
            Self::SessionInvalid(err.to_string())
        } else if err.is_client_rejection() {
            Self::ValidationRejected(err.to_string())
        } else {
            Self::Transient(err.to_string())
        }
    }
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(status: u16, message: &str) -> ApiError {
        ApiError::Rejected {
            status,
            message: message.into(),
        }
    }

    #[test]
    fn rejected_displays_server_detail_verbatim() {
        assert_eq!(
            rejected(401, "Invalid email or password").to_string(),
            "Invalid email or password"
        );
    }

    #[test]
    fn unauthorized_covers_401_and_403_only() {
        assert!(rejected(401, "Token expired").is_unauthorized());
        assert!(rejected(403, "Admin access required").is_unauthorized());
        assert!(!rejected(404, "Profile not found").is_unauthorized());
        assert!(!ApiError::Timeout.is_unauthorized());
    }

    #[test]
    fn credential_failures_become_auth_rejected() {
        assert_eq!(
            SessionError::from_credentials(rejected(400, "Email already registered")),
            SessionError::AuthRejected("Email already registered".into())
        );
        assert!(matches!(
            SessionError::from_credentials(rejected(502, "bad gateway")),
            SessionError::Transient(_)
        ));
        assert!(matches!(
            SessionError::from_credentials(ApiError::Timeout),
            SessionError::Transient(_)
        ));
    }

    #[test]
    fn request_failures_map_by_status() {
        assert!(matches!(
            SessionError::from_request(rejected(401, "Invalid token")),
            SessionError::SessionInvalid(_)
        ));
        assert_eq!(
            SessionError::from_request(rejected(404, "Profile not found")),
            SessionError::ValidationRejected("Profile not found".into())
        );
        assert!(matches!(
            SessionError::from_request(ApiError::Network("connection refused".into())),
            SessionError::Transient(_)
        ));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ApiError>();
        assert_send_sync::<SessionError>();
    }
}

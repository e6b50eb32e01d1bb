//! Failure shapes raised by the external client and their normalized form.
//!
//! DESIGN
//! ======
//! The external SDK can fail with a structured provider payload, a native
//! runtime error, or something else entirely (a failed iframe load surfaces
//! as an arbitrary event object). `ClientFailure` keeps those shapes apart;
//! `AuthError` is the one type consumers ever see.

use std::error::Error as StdError;

use serde_json::Value;

/// Fallback message used when a token request fails with an unrecognized shape.
pub const TOKEN_ERROR_MESSAGE: &str = "Get access token failed";

/// Fallback message used by the blanket `From<ClientFailure>` conversion.
pub const GENERIC_ERROR_MESSAGE: &str = "Unexpected authentication failure";

// =============================================================================
// RAW CLIENT FAILURE
// =============================================================================

/// A failure exactly as the external OAuth client reported it.
#[derive(Debug, thiserror::Error)]
pub enum ClientFailure {
    /// Structured provider error (`error` code plus optional description).
    #[error("{error}")]
    Provider { error: String, error_description: Option<String> },

    /// A native error raised by the client runtime.
    #[error(transparent)]
    Native(Box<dyn StdError + Send + Sync>),

    /// Any other value the client threw.
    #[error("unrecognized client failure: {0}")]
    Unrecognized(Value),
}

impl ClientFailure {
    /// Shorthand for a structured provider failure.
    #[must_use]
    pub fn provider(error: impl Into<String>, description: Option<&str>) -> Self {
        Self::Provider { error: error.into(), error_description: description.map(str::to_owned) }
    }

    /// Wrap any native error.
    #[must_use]
    pub fn native<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Native(Box::new(err))
    }
}

// =============================================================================
// NORMALIZED ERROR
// =============================================================================

/// The single error type surfaced by the store, orchestrator and policies.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// OAuth error returned by the authorization server.
    #[error("{}", oauth_message(.error, .error_description))]
    OAuth { error: String, error_description: Option<String> },

    /// Native client error, passed through unchanged.
    #[error(transparent)]
    Client(Box<dyn StdError + Send + Sync>),

    /// Unrecognized failure collapsed to a fallback message.
    #[error("{0}")]
    Generic(String),

    /// The user profile could not be decoded into the configured user type.
    #[error("profile decode failed: {0}")]
    Profile(#[from] serde_json::Error),

    /// The client configuration is unusable.
    #[error("invalid auth config: {0}")]
    Config(String),
}

impl AuthError {
    /// OAuth error code (`error`), when this is a provider error.
    #[must_use]
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::OAuth { error, .. } => Some(error),
            _ => None,
        }
    }

    /// OAuth error description (`errorDescription`), when one was sent.
    #[must_use]
    pub fn error_description(&self) -> Option<&str> {
        match self {
            Self::OAuth { error_description, .. } => error_description.as_deref(),
            _ => None,
        }
    }

    /// True when the provider says an interactive login is needed.
    #[must_use]
    pub fn requires_login(&self) -> bool {
        matches!(self.error_code(), Some("login_required" | "consent_required" | "interaction_required"))
    }
}

fn oauth_message<'a>(error: &'a str, description: &'a Option<String>) -> &'a str {
    description.as_deref().unwrap_or(error)
}

impl From<ClientFailure> for AuthError {
    fn from(failure: ClientFailure) -> Self {
        normalize_error(GENERIC_ERROR_MESSAGE, failure)
    }
}

/// Collapse any client failure into an [`AuthError`].
///
/// Anything carrying an `error` code becomes [`AuthError::OAuth`], native
/// errors pass through, and everything else becomes
/// [`AuthError::Generic`] with `fallback` as its message.
#[must_use]
pub fn normalize_error(fallback: &str, failure: ClientFailure) -> AuthError {
    match failure {
        ClientFailure::Provider { error, error_description } => AuthError::OAuth { error, error_description },
        ClientFailure::Native(err) => AuthError::Client(err),
        ClientFailure::Unrecognized(value) => match value.get("error").and_then(Value::as_str) {
            Some(code) => AuthError::OAuth {
                error: code.to_owned(),
                error_description: value
                    .get("error_description")
                    .and_then(Value::as_str)
                    .map(str::to_owned),
            },
            None => AuthError::Generic(fallback.to_owned()),
        },
    }
}

/// Normalizer used for silent token requests.
#[must_use]
pub fn token_error(failure: ClientFailure) -> AuthError {
    normalize_error(TOKEN_ERROR_MESSAGE, failure)
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;

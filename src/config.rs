//! Client configuration, parsed from the environment or built in code.

use std::time::Duration;

use url::Url;

use crate::error::AuthError;
use crate::options::AuthorizationParams;

/// Default stall after a full-page login redirect, in milliseconds.
pub const DEFAULT_REDIRECT_STALL_MS: u64 = 1000;

/// Options the external client is constructed from.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthConfig {
    /// Tenant domain, e.g. `tenant.eu.auth0.com`.
    pub domain: String,
    pub client_id: String,
    /// Use rotating refresh tokens instead of hidden-iframe renewal.
    pub use_refresh_tokens: bool,
    /// Fall back to iframe renewal when no refresh token is available.
    pub use_refresh_tokens_fallback: bool,
    pub authorization_params: AuthorizationParams,
    /// Post-logout URL when the caller does not pass one.
    pub logout_return_to: Option<String>,
    /// How long loader policies hold after starting a full-page redirect.
    pub redirect_stall: Duration,
}

impl AuthConfig {
    #[must_use]
    pub fn new(domain: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            client_id: client_id.into(),
            use_refresh_tokens: false,
            use_refresh_tokens_fallback: false,
            authorization_params: AuthorizationParams::default(),
            logout_return_to: None,
            redirect_stall: Duration::from_millis(DEFAULT_REDIRECT_STALL_MS),
        }
    }

    #[must_use]
    pub fn with_refresh_tokens(mut self, enabled: bool, fallback: bool) -> Self {
        self.use_refresh_tokens = enabled;
        self.use_refresh_tokens_fallback = fallback;
        self
    }

    #[must_use]
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.authorization_params.audience = Some(audience.into());
        self
    }

    #[must_use]
    pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.authorization_params.redirect_uri = Some(uri.into());
        self
    }

    #[must_use]
    pub fn with_logout_return_to(mut self, url: impl Into<String>) -> Self {
        self.logout_return_to = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_redirect_stall(mut self, stall: Duration) -> Self {
        self.redirect_stall = stall;
        self
    }

    /// Build config from environment variables.
    ///
    /// Required:
    /// - `AUTH_DOMAIN`
    /// - `AUTH_CLIENT_ID`
    ///
    /// Optional:
    /// - `AUTH_AUDIENCE`
    /// - `AUTH_REDIRECT_URI`
    /// - `AUTH_USE_REFRESH_TOKENS`: `true`/`false` (default false)
    /// - `AUTH_USE_REFRESH_TOKENS_FALLBACK`: `true`/`false` (default false)
    /// - `AUTH_LOGOUT_RETURN_TO`
    /// - `AUTH_REDIRECT_STALL_MS`: default 1000
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`] if a required variable is missing or a
    /// value does not parse.
    pub fn from_env() -> Result<Self, AuthError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AuthConfig::from_env`], reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`AuthConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AuthError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AuthError::Config(format!("{key} not set")))
        };
        let domain = required("AUTH_DOMAIN")?;
        let client_id = required("AUTH_CLIENT_ID")?;

        let mut config = Self::new(domain, client_id);
        config.authorization_params.audience = lookup("AUTH_AUDIENCE");
        config.authorization_params.redirect_uri = lookup("AUTH_REDIRECT_URI");
        config.use_refresh_tokens = parse_flag("AUTH_USE_REFRESH_TOKENS", lookup("AUTH_USE_REFRESH_TOKENS"))?;
        config.use_refresh_tokens_fallback =
            parse_flag("AUTH_USE_REFRESH_TOKENS_FALLBACK", lookup("AUTH_USE_REFRESH_TOKENS_FALLBACK"))?;
        config.logout_return_to = lookup("AUTH_LOGOUT_RETURN_TO");
        if let Some(raw) = lookup("AUTH_REDIRECT_STALL_MS") {
            let ms = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| AuthError::Config(format!("AUTH_REDIRECT_STALL_MS is not a number: {raw}")))?;
            config.redirect_stall = Duration::from_millis(ms);
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject configs the external client could never work with.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`] naming the offending field.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.domain.trim().is_empty() {
            return Err(AuthError::Config("domain is empty".into()));
        }
        if self.domain.contains('/') {
            return Err(AuthError::Config(format!("domain must be a bare host, got {}", self.domain)));
        }
        if self.client_id.trim().is_empty() {
            return Err(AuthError::Config("client_id is empty".into()));
        }
        Ok(())
    }

    /// Post-logout URL: the configured one, else the origin of `redirect_uri`.
    #[must_use]
    pub fn default_logout_return_to(&self) -> Option<String> {
        self.logout_return_to.clone().or_else(|| {
            self.authorization_params.redirect_uri.as_deref().and_then(origin_of)
        })
    }
}

fn parse_flag(key: &str, raw: Option<String>) -> Result<bool, AuthError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some("true" | "1") => Ok(true),
        Some("false" | "0") => Ok(false),
        Some(other) => Err(AuthError::Config(format!("{key} must be true or false, got {other}"))),
    }
}

/// Serialized origin (`scheme://host[:port]`) of an absolute URL. Userinfo,
/// path and default ports are dropped; scheme and host come out lowercase.
fn origin_of(uri: &str) -> Option<String> {
    let Ok(parsed) = Url::parse(uri) else {
        return None;
    };
    let origin = parsed.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

//! Option records passed through to the external client.
//!
//! DESIGN
//! ======
//! Open-ended records from the SDK surface (`AppState`, authorization
//! parameters) are a closed struct of the known fields plus a flattened
//! extension map. `AuthorizationParams` serializes with the wire names the
//! authorization server expects (`redirect_uri`, `screen_hint`, ...);
//! `AppState` serializes camelCase because it belongs to the application.

use std::fmt;
use std::sync::Arc;

use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// APP STATE
// =============================================================================

/// Application state carried through the authorization redirect and handed
/// back unchanged on the callback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    /// Path to return the user to after login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_organization_login: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_invite_login: Option<bool>,
    /// Caller-defined fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AppState {
    #[must_use]
    pub fn returning_to(path: impl Into<String>) -> Self {
        Self { return_to: Some(path.into()), ..Self::default() }
    }
}

// =============================================================================
// AUTHORIZATION PARAMS
// =============================================================================

/// Parameters forwarded to the `/authorize` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorizationParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invitation: Option<String>,
    /// `signup` or `login`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_hint: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AuthorizationParams {
    /// Fields set in `overrides` win; unset ones fall back to `self`.
    #[must_use]
    pub fn merged_with(&self, overrides: &Self) -> Self {
        let mut extra = self.extra.clone();
        extra.extend(overrides.extra.clone());
        Self {
            audience: overrides.audience.clone().or_else(|| self.audience.clone()),
            redirect_uri: overrides.redirect_uri.clone().or_else(|| self.redirect_uri.clone()),
            scope: overrides.scope.clone().or_else(|| self.scope.clone()),
            organization: overrides.organization.clone().or_else(|| self.organization.clone()),
            invitation: overrides.invitation.clone().or_else(|| self.invitation.clone()),
            screen_hint: overrides.screen_hint.clone().or_else(|| self.screen_hint.clone()),
            extra,
        }
    }
}

// =============================================================================
// LOGIN
// =============================================================================

/// Side channel the client calls with the authorize URL instead of
/// navigating on its own.
#[derive(Clone)]
pub struct RedirectHook(Arc<dyn Fn(String) -> LocalBoxFuture<'static, ()> + Send + Sync>);

impl RedirectHook {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(String) -> LocalBoxFuture<'static, ()> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Hand the authorize URL to the hook and wait for it to settle.
    pub async fn redirect(&self, url: String) {
        (self.0)(url).await;
    }
}

impl fmt::Debug for RedirectHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RedirectHook(..)")
    }
}

/// Options for `login_with_redirect`.
#[derive(Debug, Clone, Default)]
pub struct RedirectLoginOptions {
    pub app_state: Option<AppState>,
    pub authorization_params: AuthorizationParams,
    /// Fragment appended to the authorize URL, if any.
    pub fragment: Option<String>,
    pub on_redirect: Option<RedirectHook>,
}

// =============================================================================
// LOGOUT
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogoutParams {
    /// Where the authorization server sends the browser after logout.
    #[serde(default, rename = "returnTo", skip_serializing_if = "Option::is_none")]
    pub return_to: Option<String>,
    /// Also log out of the upstream identity provider.
    #[serde(default)]
    pub federated: bool,
}

/// Options for `logout`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogoutOptions {
    /// Override the client id sent to the logout endpoint.
    pub client_id: Option<String>,
    pub logout_params: LogoutParams,
    /// Clear the local session without redirecting to the logout endpoint.
    pub local_only: bool,
}

// =============================================================================
// TOKENS
// =============================================================================

/// How the external client treats its token cache on a silent request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheMode {
    /// Use a cached token when valid, otherwise fetch.
    #[default]
    On,
    /// Always fetch a fresh token.
    Off,
    /// Only return a cached token; never hit the network.
    CacheOnly,
}

/// Options for `get_access_token_silently`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetTokenSilentlyOptions {
    pub cache_mode: CacheMode,
    pub authorization_params: AuthorizationParams,
    pub timeout_in_seconds: Option<u64>,
}

impl GetTokenSilentlyOptions {
    /// Bypass the token cache.
    #[must_use]
    pub fn fresh() -> Self {
        Self { cache_mode: CacheMode::Off, ..Self::default() }
    }
}

/// Options for `update_user`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateUserOptions {
    /// Refresh the user from the authorization server instead of merging locally.
    pub fetch_new_token: bool,
}

// =============================================================================
// CLIENT RESULTS
// =============================================================================

/// Decoded ID token claims.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdTokenClaims {
    /// The encoded token.
    #[serde(rename = "__raw")]
    pub raw: String,
    #[serde(flatten)]
    pub claims: Map<String, Value>,
}

impl IdTokenClaims {
    #[must_use]
    pub fn get(&self, claim: &str) -> Option<&Value> {
        self.claims.get(claim)
    }
}

/// Outcome of completing an authorization redirect.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RedirectLoginResult {
    pub app_state: Option<AppState>,
}

#[cfg(test)]
#[path = "options_test.rs"]
mod tests;

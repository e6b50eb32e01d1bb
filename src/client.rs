//! Seam to the external OAuth/OIDC client SDK.
//!
//! ARCHITECTURE
//! ============
//! Everything protocol-related (authorize redirects, PKCE, code exchange,
//! refresh rotation, token cache) happens behind this trait. Browser
//! implementations wrap the vendor SDK and hold non-`Send` futures, so the
//! methods are `?Send`; the implementing type itself must be shareable so
//! the store can sit in UI context.

use serde_json::Value;

use crate::error::ClientFailure;
use crate::options::{GetTokenSilentlyOptions, IdTokenClaims, LogoutOptions, RedirectLoginOptions, RedirectLoginResult};

#[async_trait::async_trait(?Send)]
pub trait OAuthClient: Send + Sync {
    /// Start the authorization redirect. When `options.on_redirect` is set the
    /// client hands it the authorize URL instead of navigating itself.
    async fn login_with_redirect(&self, options: RedirectLoginOptions) -> Result<(), ClientFailure>;

    /// Clear the local session and redirect to the logout endpoint.
    async fn logout(&self, options: LogoutOptions) -> Result<(), ClientFailure>;

    /// Return a valid access token, refreshing it if needed.
    async fn get_token_silently(&self, options: GetTokenSilentlyOptions) -> Result<String, ClientFailure>;

    /// Raw (snake_case) profile of the current session, if any.
    async fn get_user(&self) -> Result<Option<Value>, ClientFailure>;

    async fn get_id_token_claims(&self) -> Result<Option<IdTokenClaims>, ClientFailure>;

    /// Restore an existing session silently. Absence of a session is not an error.
    async fn check_session(&self) -> Result<(), ClientFailure>;

    /// Exchange the `code`/`state` carried by `url` for a session.
    async fn handle_redirect_callback(&self, url: &str) -> Result<RedirectLoginResult, ClientFailure>;
}

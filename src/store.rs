//! Session state store wrapping the external OAuth client.
//!
//! DESIGN
//! ======
//! The snapshot lives in a `tokio::sync::watch` channel. Every mutation
//! builds a complete new snapshot from the current one and swaps it in, so
//! readers never observe a half-applied update, and a mutation that would
//! change nothing skips the notification entirely.
//!
//! ERROR HANDLING
//! ==============
//! Only the silent token path normalizes failures. Login, logout and claims
//! hand the client's failure back untouched; initialization failures are
//! captured into `error` by the orchestrator instead of being returned.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::client::OAuthClient;
use crate::config::AuthConfig;
use crate::error::{AuthError, ClientFailure, token_error};
use crate::options::{
    GetTokenSilentlyOptions, IdTokenClaims, LogoutOptions, RedirectLoginOptions, UpdateUserOptions,
};
use crate::profile::{Profile, User, decode_profile, merge_profile};

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Immutable view of the session at one point in time.
#[derive(Debug, Clone)]
pub struct AuthSnapshot<U = User> {
    /// True until the first initialization attempt completes.
    pub is_loading: bool,
    /// Always equal to `user.is_some()`.
    pub is_authenticated: bool,
    pub error: Option<Arc<AuthError>>,
    pub user: Option<U>,
}

impl<U> Default for AuthSnapshot<U> {
    fn default() -> Self {
        Self { is_loading: true, is_authenticated: false, error: None, user: None }
    }
}

// =============================================================================
// STORE
// =============================================================================

/// Shared auth state plus the actions that drive it.
///
/// One per application, shared behind an `Arc`. State is only ever changed
/// through the methods below.
pub struct AuthStore<U: Profile = User> {
    config: AuthConfig,
    client: Arc<dyn OAuthClient>,
    state: watch::Sender<AuthSnapshot<U>>,
}

impl<U: Profile> AuthStore<U> {
    /// Validate `config` and build the external client from it, once.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`] if the config is unusable.
    pub fn create<C, F>(config: AuthConfig, build: F) -> Result<Self, AuthError>
    where
        C: OAuthClient + 'static,
        F: FnOnce(&AuthConfig) -> C,
    {
        config.validate()?;
        let client = build(&config);
        Ok(Self::with_client(config, Arc::new(client)))
    }

    /// Wrap an already constructed client.
    #[must_use]
    pub fn with_client(config: AuthConfig, client: Arc<dyn OAuthClient>) -> Self {
        let (state, _) = watch::channel(AuthSnapshot::default());
        Self { config, client, state }
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Clone of the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> AuthSnapshot<U> {
        self.state.borrow().clone()
    }

    /// Borrow the current snapshot without cloning. Do not hold the guard
    /// across an action call.
    pub fn borrow(&self) -> watch::Ref<'_, AuthSnapshot<U>> {
        self.state.borrow()
    }

    /// Receiver notified after every effective state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot<U>> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated
    }

    #[must_use]
    pub fn user(&self) -> Option<U> {
        self.state.borrow().user.clone()
    }

    #[must_use]
    pub fn client(&self) -> &Arc<dyn OAuthClient> {
        &self.client
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Actions
    // -------------------------------------------------------------------------

    /// Start the authorization redirect. Usually the page navigates away
    /// before this resolves. Configured authorization params fill in whatever
    /// the caller leaves unset.
    ///
    /// # Errors
    ///
    /// The client's failure, unmodified.
    pub async fn login_with_redirect(&self, mut options: RedirectLoginOptions) -> Result<(), ClientFailure> {
        options.authorization_params = self.config.authorization_params.merged_with(&options.authorization_params);
        debug!(
            return_to = options.app_state.as_ref().and_then(|s| s.return_to.as_deref()),
            "login with redirect"
        );
        self.client.login_with_redirect(options).await
    }

    /// Log out, defaulting the post-logout URL from config.
    ///
    /// # Errors
    ///
    /// The client's failure, unmodified.
    pub async fn logout(&self, mut options: LogoutOptions) -> Result<(), ClientFailure> {
        if options.logout_params.return_to.is_none() {
            options.logout_params.return_to = self.config.default_logout_return_to();
        }
        debug!(return_to = options.logout_params.return_to.as_deref(), "logout");
        self.client.logout(options).await
    }

    /// Fetch an access token, then refresh the stored user from the client.
    ///
    /// The user refresh runs whether or not the token request succeeded. The
    /// stored user is only replaced when its `updated_at` differs.
    ///
    /// # Errors
    ///
    /// The token failure normalized through [`token_error`], or the user
    /// refresh failure, which takes precedence.
    pub async fn get_access_token_silently(&self, options: GetTokenSilentlyOptions) -> Result<String, AuthError> {
        debug!(cache_mode = ?options.cache_mode, "silent token request");
        let token = self.client.get_token_silently(options).await.map_err(token_error);
        if let Err(err) = &token {
            warn!(error = %err, "silent token request failed");
        }
        self.refresh_user().await?;
        token
    }

    /// Decoded ID token claims, straight from the client.
    ///
    /// # Errors
    ///
    /// The client's failure, unmodified.
    pub async fn get_id_token_claims(&self) -> Result<Option<IdTokenClaims>, ClientFailure> {
        self.client.get_id_token_claims().await
    }

    /// Update the stored user.
    ///
    /// With `fetch_new_token` the user is re-read from the authorization
    /// server through a cache-bypassing token request and `patch` is
    /// ignored. Otherwise `patch` (camelCase fields) is shallow-merged onto
    /// the current user locally; nothing is sent to the server.
    ///
    /// # Errors
    ///
    /// Token/refresh failures in fetch mode; [`AuthError::Profile`] if the
    /// merged record no longer fits `U`.
    pub async fn update_user(&self, patch: Value, options: UpdateUserOptions) -> Result<Option<U>, AuthError> {
        if options.fetch_new_token {
            self.get_access_token_silently(GetTokenSilentlyOptions::fresh()).await?;
            return Ok(self.user());
        }
        let current = self.user();
        let merged: U = merge_profile(current.as_ref(), patch)?;
        let stored = merged.clone();
        self.set(move |state| {
            Some(AuthSnapshot { is_authenticated: true, user: Some(stored), ..state.clone() })
        });
        Ok(Some(merged))
    }

    // -------------------------------------------------------------------------
    // Internal transitions
    // -------------------------------------------------------------------------

    /// Settle the first load with `user` (or no session).
    pub(crate) fn initialised(&self, user: Option<U>) {
        self.set(move |_| {
            Some(AuthSnapshot { is_loading: false, is_authenticated: user.is_some(), error: None, user })
        });
    }

    /// Settle the first load with a failure.
    pub(crate) fn set_error(&self, error: AuthError) {
        let error = Arc::new(error);
        self.set(move |state| Some(AuthSnapshot { is_loading: false, error: Some(error), ..state.clone() }));
    }

    /// Current profile from the client, camelized and decoded.
    pub(crate) async fn fetch_user(&self) -> Result<Option<U>, AuthError> {
        self.client.get_user().await?.map(decode_profile::<U>).transpose()
    }

    async fn refresh_user(&self) -> Result<(), AuthError> {
        let Some(user) = self.fetch_user().await? else {
            return Ok(());
        };
        let replaced = self.set(move |state| {
            let unchanged = state
                .user
                .as_ref()
                .is_some_and(|current| current.updated_at() == user.updated_at());
            (!unchanged).then(|| AuthSnapshot { is_authenticated: true, user: Some(user), ..state.clone() })
        });
        debug!(replaced, "user refreshed after token request");
        Ok(())
    }

    /// Copy-on-write update. `f` returns the next snapshot, or `None` to
    /// leave state (and subscribers) untouched.
    fn set<F>(&self, f: F) -> bool
    where
        F: FnOnce(&AuthSnapshot<U>) -> Option<AuthSnapshot<U>>,
    {
        self.state.send_if_modified(|state| match f(state) {
            Some(next) => {
                *state = next;
                true
            }
            None => false,
        })
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;

//! One-shot session bootstrap on application mount.
//!
//! ARCHITECTURE
//! ============
//! On the first run the page location decides the branch: a returning
//! authorization redirect (`code` or `error`, plus `state`) is completed
//! through the client, anything else goes through a silent session check.
//! Either way the store leaves its loading state, with a user, without one,
//! or with a captured error.
//!
//! The latch is owned by the `Initializer`, so the UI layer keeps one
//! instance for its mounted lifetime and may call `run` as often as its
//! effects fire.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};
use url::form_urlencoded;

use crate::error::AuthError;
use crate::navigator::Navigator;
use crate::options::AppState;
use crate::profile::{Profile, User};
use crate::store::AuthStore;

/// Called after a redirect has been completed, with the round-tripped app
/// state and the freshly loaded user.
pub type RedirectCallback<U> = Arc<dyn Fn(Option<AppState>, Option<&U>) + Send + Sync>;

/// True when `search` carries an authorization response: a non-empty `code`
/// or `error` together with a non-empty `state`.
#[must_use]
pub fn has_auth_params(search: &str) -> bool {
    let (mut code_or_error, mut state) = (false, false);
    for (key, value) in form_urlencoded::parse(search.trim_start_matches('?').as_bytes()) {
        if value.is_empty() {
            continue;
        }
        match key.as_ref() {
            "code" | "error" => code_or_error = true,
            "state" => state = true,
            _ => {}
        }
    }
    code_or_error && state
}

/// Drop the authorization parameters from the visible URL by replacing the
/// history entry with `returnTo`, or the current path.
pub fn default_redirect_callback(navigator: &dyn Navigator, app_state: Option<&AppState>) {
    let target = app_state
        .and_then(|s| s.return_to.clone())
        .filter(|path| !path.is_empty())
        .unwrap_or_else(|| navigator.pathname());
    navigator.replace_state(&target);
}

pub struct Initializer<U: Profile = User> {
    started: AtomicBool,
    skip_redirect_callback: bool,
    on_redirect_callback: Option<RedirectCallback<U>>,
}

impl<U: Profile> Default for Initializer<U> {
    fn default() -> Self {
        Self { started: AtomicBool::new(false), skip_redirect_callback: false, on_redirect_callback: None }
    }
}

impl<U: Profile> Initializer<U> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ignore `code`/`state` parameters that belong to some other OAuth flow.
    #[must_use]
    pub fn skip_redirect_callback(mut self, skip: bool) -> Self {
        self.skip_redirect_callback = skip;
        self
    }

    /// Replace the default history rewrite after a completed redirect.
    #[must_use]
    pub fn on_redirect_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(Option<AppState>, Option<&U>) + Send + Sync + 'static,
    {
        self.on_redirect_callback = Some(Arc::new(callback));
        self
    }

    #[must_use]
    pub fn has_run(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Bootstrap the store. Only the first call does anything; it returns
    /// `true`, every later call returns `false`.
    ///
    /// Failures never escape: they end up in the store's `error`.
    pub async fn run(&self, store: &AuthStore<U>, navigator: &dyn Navigator) -> bool {
        if self.started.swap(true, Ordering::AcqRel) {
            debug!("auth already initialized; skipping");
            return false;
        }
        match self.bootstrap(store, navigator).await {
            Ok(authenticated) => info!(authenticated, "auth initialized"),
            Err(err) => {
                warn!(error = %err, "auth initialization failed");
                store.set_error(err);
            }
        }
        true
    }

    async fn bootstrap(&self, store: &AuthStore<U>, navigator: &dyn Navigator) -> Result<bool, AuthError> {
        if !self.skip_redirect_callback && has_auth_params(&navigator.search()) {
            debug!("completing authorization redirect");
            let result = store.client().handle_redirect_callback(&navigator.href()).await?;
            let user = store.fetch_user().await?;
            let authenticated = user.is_some();
            store.initialised(user.clone());
            match &self.on_redirect_callback {
                Some(callback) => callback(result.app_state, user.as_ref()),
                None => default_redirect_callback(navigator, result.app_state.as_ref()),
            }
            return Ok(authenticated);
        }

        store.client().check_session().await?;
        let user = store.fetch_user().await?;
        let authenticated = user.is_some();
        store.initialised(user);
        Ok(authenticated)
    }
}

#[cfg(test)]
#[path = "init_test.rs"]
mod tests;

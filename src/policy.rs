//! Auth policies for code that runs outside the component tree, such as
//! route loaders.
//!
//! Each policy reads the store snapshot directly and either hands control to
//! the caller's continuation or starts a login redirect. A redirect started
//! from a loader must not let the loader carry on rendering, so `authorize`
//! navigates through the `Navigator` and then stalls before resolving.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, info};

use crate::error::{AuthError, ClientFailure};
use crate::navigator::Navigator;
use crate::options::{AppState, AuthorizationParams, RedirectHook, RedirectLoginOptions};
use crate::profile::Profile;
use crate::store::AuthStore;

pub const DEFAULT_RETURN_TO: &str = "/";

// =============================================================================
// RETURN TO
// =============================================================================

/// Where the user lands after login: a fixed path, or a function evaluated
/// when the login is triggered.
#[derive(Clone)]
pub enum ReturnTo {
    Path(String),
    Dynamic(Arc<dyn Fn() -> String + Send + Sync>),
}

impl ReturnTo {
    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Self::Dynamic(Arc::new(f))
    }

    #[must_use]
    pub fn resolve(&self) -> String {
        match self {
            Self::Path(path) => path.clone(),
            Self::Dynamic(f) => f(),
        }
    }
}

impl Default for ReturnTo {
    fn default() -> Self {
        Self::Path(DEFAULT_RETURN_TO.to_owned())
    }
}

impl From<&str> for ReturnTo {
    fn from(path: &str) -> Self {
        Self::Path(path.to_owned())
    }
}

impl From<String> for ReturnTo {
    fn from(path: String) -> Self {
        Self::Path(path)
    }
}

impl fmt::Debug for ReturnTo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Caller login options with `appState.returnTo` set to the resolved
/// `return_to`. Other app state fields are kept.
#[must_use]
pub fn login_options_with_return_to(login_options: &RedirectLoginOptions, return_to: &ReturnTo) -> RedirectLoginOptions {
    let mut options = login_options.clone();
    let mut app_state = options.app_state.take().unwrap_or_default();
    app_state.return_to = Some(return_to.resolve());
    options.app_state = Some(app_state);
    options
}

// =============================================================================
// LOADER POLICIES
// =============================================================================

/// Result of a gated loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorized<R> {
    /// The callback ran with the authenticated user.
    Granted(R),
    /// No session; a login redirect was started instead.
    Redirected,
}

impl<R> Authorized<R> {
    #[must_use]
    pub fn granted(self) -> Option<R> {
        match self {
            Self::Granted(value) => Some(value),
            Self::Redirected => None,
        }
    }

    #[must_use]
    pub fn is_redirected(&self) -> bool {
        matches!(self, Self::Redirected)
    }
}

/// Run `callback` with the current user, establishing the session first if
/// needed.
///
/// A stored user is used as is. Otherwise the client's session is checked;
/// a profile found there initializes the store. With no session at all a
/// login redirect starts: the browser is sent to the authorize URL through
/// `navigator` and the future stalls for `config.redirect_stall` so the
/// loader cannot proceed while the page unloads.
///
/// # Errors
///
/// Session check, profile and login failures. An absent session is not an
/// error.
pub async fn authorize<U, F, Fut, R>(
    store: &AuthStore<U>,
    navigator: Arc<dyn Navigator>,
    return_to: &ReturnTo,
    callback: F,
) -> Result<Authorized<R>, AuthError>
where
    U: Profile,
    F: FnOnce(U) -> Fut,
    Fut: Future<Output = R>,
{
    if let Some(user) = store.user() {
        return Ok(Authorized::Granted(callback(user).await));
    }

    store.client().check_session().await?;
    if let Some(user) = store.fetch_user().await? {
        debug!("loader restored existing session");
        store.initialised(Some(user.clone()));
        return Ok(Authorized::Granted(callback(user).await));
    }

    let return_to = return_to.resolve();
    info!(%return_to, "no session; redirecting loader to login");
    let stall = store.config().redirect_stall;
    let on_redirect = RedirectHook::new(move |url| {
        let navigator = Arc::clone(&navigator);
        async move {
            navigator.replace_location(&url);
            navigator.stall(stall).await;
        }
        .boxed_local()
    });
    store
        .login_with_redirect(RedirectLoginOptions {
            app_state: Some(AppState::returning_to(return_to)),
            on_redirect: Some(on_redirect),
            ..RedirectLoginOptions::default()
        })
        .await?;
    Ok(Authorized::Redirected)
}

/// Complete the authorization redirect carried by `url`, initialize the
/// store and hand the round-tripped app state to `callback`.
///
/// # Errors
///
/// Redirect completion and profile failures.
pub async fn handle_redirect_callback<U, F, Fut, R>(store: &AuthStore<U>, url: &str, callback: F) -> Result<R, AuthError>
where
    U: Profile,
    F: FnOnce(Option<AppState>) -> Fut,
    Fut: Future<Output = R>,
{
    let result = store.client().handle_redirect_callback(url).await?;
    let user = store.fetch_user().await?;
    debug!(authenticated = user.is_some(), "loader completed redirect");
    store.initialised(user);
    Ok(callback(result.app_state).await)
}

/// Start a login redirect unless the store is already authenticated.
/// Returns whether a redirect was started.
///
/// # Errors
///
/// The client's login failure, unmodified.
pub async fn loader_with_auth<U: Profile>(
    store: &AuthStore<U>,
    login_options: &RedirectLoginOptions,
    return_to: &ReturnTo,
) -> Result<bool, ClientFailure> {
    if store.is_authenticated() {
        return Ok(false);
    }
    store.login_with_redirect(login_options_with_return_to(login_options, return_to)).await?;
    Ok(true)
}

// =============================================================================
// INVITATIONS
// =============================================================================

/// Login options for an organization invitation link.
///
/// `query` is the landing page's query string. Both `organization` and
/// `invitation` must be present and non-empty, otherwise there is nothing to
/// accept and `None` is returned.
#[must_use]
pub fn invitation_login_options(query: &str) -> Option<RedirectLoginOptions> {
    let mut organization = None;
    let mut invitation = None;
    for (key, value) in url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
        match key.as_ref() {
            "organization" if !value.is_empty() => organization = Some(value.into_owned()),
            "invitation" if !value.is_empty() => invitation = Some(value.into_owned()),
            _ => {}
        }
    }
    let (organization, invitation) = (organization?, invitation?);
    Some(RedirectLoginOptions {
        app_state: Some(AppState {
            return_to: Some(DEFAULT_RETURN_TO.to_owned()),
            is_invite_login: Some(true),
            ..AppState::default()
        }),
        authorization_params: AuthorizationParams {
            organization: Some(organization),
            invitation: Some(invitation),
            ..AuthorizationParams::default()
        },
        ..RedirectLoginOptions::default()
    })
}

#[cfg(test)]
#[path = "policy_test.rs"]
mod tests;

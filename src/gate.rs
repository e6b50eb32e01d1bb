//! Declarative access gate, independent of any UI framework.
//!
//! A view shows its protected content only while the gate is `Open`. When
//! the session has settled and the gate is `Closed`, `poll` starts a login
//! redirect. The redirect is triggered once per closed episode; the latch
//! rearms as soon as the gate is seen open again.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use crate::error::ClientFailure;
use crate::options::RedirectLoginOptions;
use crate::policy::{ReturnTo, login_options_with_return_to};
use crate::profile::{Profile, User};
use crate::store::{AuthSnapshot, AuthStore};

/// Extra authorization check over the loaded user, on top of being logged in.
pub type ClaimCheck<U> = Arc<dyn Fn(Option<&U>) -> bool + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStatus {
    /// Session not settled yet; show the placeholder, do nothing.
    Loading,
    /// Authenticated and the claim check passed.
    Open,
    /// Settled but not allowed in; show the placeholder and log in.
    Closed,
}

pub struct AuthGate<U: Profile = User> {
    return_to: ReturnTo,
    login_options: RedirectLoginOptions,
    claim_check: Option<ClaimCheck<U>>,
    triggered: AtomicBool,
}

impl<U: Profile> Default for AuthGate<U> {
    fn default() -> Self {
        Self {
            return_to: ReturnTo::default(),
            login_options: RedirectLoginOptions::default(),
            claim_check: None,
            triggered: AtomicBool::new(false),
        }
    }
}

impl<U: Profile> fmt::Debug for AuthGate<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthGate")
            .field("return_to", &self.return_to)
            .field("login_options", &self.login_options)
            .field("claim_check", &self.claim_check.is_some())
            .field("triggered", &self.triggered.load(Ordering::Relaxed))
            .finish()
    }
}

impl<U: Profile> AuthGate<U> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn return_to(mut self, return_to: impl Into<ReturnTo>) -> Self {
        self.return_to = return_to.into();
        self
    }

    /// Extra login options; their `appState` is kept alongside `returnTo`.
    #[must_use]
    pub fn login_options(mut self, options: RedirectLoginOptions) -> Self {
        self.login_options = options;
        self
    }

    #[must_use]
    pub fn claim_check<F>(mut self, check: F) -> Self
    where
        F: Fn(Option<&U>) -> bool + Send + Sync + 'static,
    {
        self.claim_check = Some(Arc::new(check));
        self
    }

    #[must_use]
    pub fn evaluate(&self, snapshot: &AuthSnapshot<U>) -> GateStatus {
        let claims_ok = self.claim_check.as_ref().is_none_or(|check| check(snapshot.user.as_ref()));
        if snapshot.is_authenticated && claims_ok {
            GateStatus::Open
        } else if snapshot.is_loading {
            GateStatus::Loading
        } else {
            GateStatus::Closed
        }
    }

    /// Login options the gate sends, with `returnTo` resolved now.
    #[must_use]
    pub fn login_request(&self) -> RedirectLoginOptions {
        login_options_with_return_to(&self.login_options, &self.return_to)
    }

    /// Evaluate the store and start a login redirect if the gate has just
    /// closed.
    ///
    /// # Errors
    ///
    /// The client's login failure, unmodified. The latch is released so the
    /// next poll may try again.
    pub async fn poll(&self, store: &AuthStore<U>) -> Result<GateStatus, ClientFailure> {
        let status = self.evaluate(&store.borrow());
        match status {
            GateStatus::Open => self.triggered.store(false, Ordering::Release),
            GateStatus::Loading => {}
            GateStatus::Closed => {
                if self.triggered.swap(true, Ordering::AcqRel) {
                    return Ok(status);
                }
                let options = self.login_request();
                debug!(
                    return_to = options.app_state.as_ref().and_then(|s| s.return_to.as_deref()),
                    "gate closed; starting login"
                );
                if let Err(err) = store.login_with_redirect(options).await {
                    warn!(error = %err, "gate login redirect failed");
                    self.triggered.store(false, Ordering::Release);
                    return Err(err);
                }
            }
        }
        Ok(status)
    }
}

#[cfg(test)]
#[path = "gate_test.rs"]
mod tests;

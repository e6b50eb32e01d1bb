//! Context accessors for components under `AuthProvider`.
//!
//! The snapshot signal is read-only; state changes go through the store's
//! actions and reach the signal through the provider's subscription.

use std::sync::Arc;

use authsync::{AuthError, AuthSnapshot, AuthStore, User};
use leptos::prelude::*;

/// What `AuthProvider` puts in context.
#[derive(Clone)]
pub struct AuthContext {
    pub store: Arc<AuthStore>,
    pub state: ReadSignal<AuthSnapshot>,
}

/// The auth context. Panics outside an `AuthProvider`.
pub fn use_auth() -> AuthContext {
    expect_context::<AuthContext>()
}

/// The store, for calling actions such as `login_with_redirect`.
pub fn use_auth_store() -> Arc<AuthStore> {
    use_auth().store
}

pub fn use_auth_state() -> ReadSignal<AuthSnapshot> {
    use_auth().state
}

pub fn use_user() -> Memo<Option<User>> {
    let state = use_auth_state();
    Memo::new(move |_| state.with(select_user))
}

pub fn use_is_authenticated() -> Signal<bool> {
    let state = use_auth_state();
    Signal::derive(move || state.with(|s| s.is_authenticated))
}

pub fn use_is_loading() -> Signal<bool> {
    let state = use_auth_state();
    Signal::derive(move || state.with(|s| s.is_loading))
}

/// Message of the captured auth error, if any.
pub fn use_auth_error() -> Signal<Option<String>> {
    let state = use_auth_state();
    Signal::derive(move || state.with(select_error_message))
}

// =============================================================================
// Selectors
// =============================================================================

pub fn select_user(snapshot: &AuthSnapshot) -> Option<User> {
    snapshot.user.clone()
}

pub fn select_error_message(snapshot: &AuthSnapshot) -> Option<String> {
    snapshot.error.as_deref().map(AuthError::to_string)
}

#[cfg(test)]
#[path = "hooks_test.rs"]
mod hooks_test;

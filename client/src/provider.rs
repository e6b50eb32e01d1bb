//! Root auth component.
//!
//! SYSTEM CONTEXT
//! ==============
//! Mount once, above the router. Descendants read the session through the
//! hooks in `crate::hooks`; loaders can keep using the same store directly.

use std::sync::Arc;

use authsync::init::RedirectCallback;
use authsync::{AuthSnapshot, AuthStore, Initializer, Navigator, User};
use futures::future::{AbortHandle, Abortable};
use leptos::prelude::*;
use tokio::sync::watch;
use tracing::debug;

use crate::hooks::AuthContext;

fn default_navigator() -> Option<Arc<dyn Navigator>> {
    #[cfg(feature = "hydrate")]
    {
        Some(Arc::new(crate::browser::BrowserNavigator))
    }
    #[cfg(not(feature = "hydrate"))]
    {
        None
    }
}

/// Copy every store snapshot into `state` until the store is dropped or the
/// signal is disposed.
pub(crate) async fn mirror_snapshots(mut rx: watch::Receiver<AuthSnapshot>, state: RwSignal<AuthSnapshot>) {
    loop {
        let next = rx.borrow_and_update().clone();
        if state.try_set(next).is_some() {
            debug!("auth state signal disposed; stopping snapshot bridge");
            return;
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}

/// Provide `store` to the tree and bootstrap the session after mount.
///
/// `skip_redirect_callback` ignores `code`/`state` parameters that belong to
/// another OAuth flow. `on_redirect_callback` replaces the default
/// `history.replaceState` once a redirect has been completed, e.g. to
/// navigate through the router instead.
#[component]
pub fn AuthProvider(
    store: Arc<AuthStore>,
    #[prop(optional)] skip_redirect_callback: bool,
    #[prop(optional)] on_redirect_callback: Option<RedirectCallback<User>>,
    #[prop(optional)] navigator: Option<Arc<dyn Navigator>>,
    children: Children,
) -> impl IntoView {
    let state = RwSignal::new(store.snapshot());
    provide_context(AuthContext { store: Arc::clone(&store), state: state.read_only() });

    let mut initializer = Initializer::new().skip_redirect_callback(skip_redirect_callback);
    if let Some(callback) = on_redirect_callback {
        initializer = initializer.on_redirect_callback(move |app_state, user| callback(app_state, user));
    }
    let initializer = Arc::new(initializer);
    let navigator = navigator.or_else(default_navigator);

    // Effects only run in the browser, after hydration.
    Effect::new(move || {
        let (abort, registration) = AbortHandle::new_pair();
        on_cleanup(move || abort.abort());
        let bridge = Abortable::new(mirror_snapshots(store.subscribe(), state), registration);
        leptos::task::spawn_local(async move {
            if bridge.await.is_err() {
                debug!("auth provider unmounted; snapshot bridge aborted");
            }
        });

        let Some(navigator) = navigator.clone() else {
            debug!("no navigator; skipping auth bootstrap");
            return;
        };
        let store = Arc::clone(&store);
        let initializer = Arc::clone(&initializer);
        leptos::task::spawn_local(async move {
            initializer.run(&store, navigator.as_ref()).await;
        });
    });

    children()
}

#[cfg(test)]
#[path = "provider_test.rs"]
mod provider_test;

//! Component gate over the session.

use std::sync::Arc;

use authsync::gate::ClaimCheck;
use authsync::{AuthGate, GateStatus, RedirectLoginOptions, ReturnTo, User};
use leptos::prelude::*;
use tracing::warn;

use crate::hooks::use_auth;

const DEFAULT_REDIRECTING: &str = "Redirecting...";

/// Render `children` only for an authenticated user who passes
/// `claim_check`. Anyone else sees `redirecting` and, once the session has
/// settled, is sent to login with `appState.returnTo` set from `return_to`.
#[component]
pub fn AuthRequired(
    #[prop(optional, into)] return_to: Option<ReturnTo>,
    #[prop(optional)] login_options: Option<RedirectLoginOptions>,
    #[prop(optional)] claim_check: Option<ClaimCheck<User>>,
    #[prop(optional, into)] redirecting: Option<ViewFn>,
    children: ChildrenFn,
) -> impl IntoView {
    let auth = use_auth();

    let mut gate = AuthGate::new();
    if let Some(return_to) = return_to {
        gate = gate.return_to(return_to);
    }
    if let Some(options) = login_options {
        gate = gate.login_options(options);
    }
    if let Some(check) = claim_check {
        gate = gate.claim_check(move |user| check(user));
    }
    let gate = Arc::new(gate);

    let state = auth.state;
    let status = Memo::new({
        let gate = Arc::clone(&gate);
        move |_| state.with(|snap| gate.evaluate(snap))
    });

    let store = auth.store;
    Effect::new(move || {
        // Track every transition so the gate can rearm when it opens.
        status.track();
        let gate = Arc::clone(&gate);
        let store = Arc::clone(&store);
        leptos::task::spawn_local(async move {
            if let Err(err) = gate.poll(&store).await {
                warn!(error = %err, "login redirect from gate failed");
            }
        });
    });

    let redirecting = redirecting.unwrap_or_else(|| ViewFn::from(|| DEFAULT_REDIRECTING));

    view! {
        <Show when=move || status.get() == GateStatus::Open fallback=redirecting>
            {children()}
        </Show>
    }
}

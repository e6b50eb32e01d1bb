use std::time::Duration;

use super::*;
use crate::options::AuthorizationParams;
use crate::profile::User;
use crate::test_helpers::{AUTHORIZE_URL, MockClient, MockNavigator, raw_user, store_with};
use serde_json::json;

fn nav() -> Arc<MockNavigator> {
    MockNavigator::at("/reports", "")
}

// =============================================================================
// ReturnTo
// =============================================================================

#[test]
fn return_to_defaults_to_root() {
    assert_eq!(ReturnTo::default().resolve(), "/");
}

#[test]
fn return_to_dynamic_is_evaluated_on_resolve() {
    let counter = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let seen = Arc::clone(&counter);
    let return_to = ReturnTo::dynamic(move || {
        let n = seen.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        format!("/page/{n}")
    });
    assert_eq!(return_to.resolve(), "/page/0");
    assert_eq!(return_to.resolve(), "/page/1");
}

#[test]
fn login_options_keep_caller_app_state() {
    let mut app_state = AppState::default();
    app_state.extra.insert("customProp".into(), json!("foo"));
    let caller = RedirectLoginOptions {
        app_state: Some(app_state),
        authorization_params: AuthorizationParams { screen_hint: Some("signup".into()), ..Default::default() },
        ..Default::default()
    };

    let merged = login_options_with_return_to(&caller, &"/settings".into());

    let app_state = merged.app_state.unwrap();
    assert_eq!(app_state.return_to.as_deref(), Some("/settings"));
    assert_eq!(app_state.extra.get("customProp"), Some(&json!("foo")));
    assert_eq!(merged.authorization_params.screen_hint.as_deref(), Some("signup"));
}

#[test]
fn login_options_return_to_overrides_caller_value() {
    let caller = RedirectLoginOptions { app_state: Some(AppState::returning_to("/old")), ..Default::default() };
    let merged = login_options_with_return_to(&caller, &ReturnTo::default());
    assert_eq!(merged.app_state.unwrap().return_to.as_deref(), Some("/"));
}

// =============================================================================
// authorize
// =============================================================================

#[tokio::test]
async fn authorize_uses_stored_user_without_client_calls() {
    let mock = MockClient::new();
    let store = store_with(&mock);
    store.initialised(Some(crate::profile::decode_profile(raw_user("t1")).unwrap()));

    let result = authorize(&store, nav(), &ReturnTo::default(), |user: User| async move { user.given_name })
        .await
        .unwrap();

    assert_eq!(result, Authorized::Granted(Some("Ada".to_owned())));
    assert!(mock.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn authorize_restores_session_and_initializes() {
    let mock = MockClient::with_user(raw_user("t1"));
    let store = store_with(&mock);

    let result = authorize(&store, nav(), &ReturnTo::default(), |user: User| async move { user.email })
        .await
        .unwrap();

    assert_eq!(result.granted(), Some(Some("ada@example.com".to_owned())));
    assert_eq!(mock.count("check_session"), 1);
    assert!(!store.is_loading());
    assert!(store.is_authenticated());
}

#[tokio::test]
async fn authorize_without_session_redirects_and_stalls() {
    let mock = MockClient::new();
    let store = store_with(&mock);
    let nav = nav();

    let result = authorize(&store, nav.clone(), &"/reports".into(), |_user: User| async { "unused" })
        .await
        .unwrap();

    assert!(result.is_redirected());
    assert_eq!(mock.count("login_with_redirect"), 1);
    let options = mock.login_options.lock().unwrap();
    assert_eq!(options[0].app_state.as_ref().unwrap().return_to.as_deref(), Some("/reports"));
    assert_eq!(*nav.replaced_locations.lock().unwrap(), vec![AUTHORIZE_URL.to_owned()]);
    assert_eq!(*nav.stalls.lock().unwrap(), vec![Duration::from_millis(1000)]);
    assert!(store.is_loading());
}

#[tokio::test]
async fn authorize_propagates_session_check_failure() {
    let mock = MockClient::new();
    *mock.session_failure.lock().unwrap() = Some(json!({ "error": "timeout_error" }));
    let store = store_with(&mock);

    let err = authorize(&store, nav(), &ReturnTo::default(), |_user: User| async {}).await.unwrap_err();

    assert_eq!(err.error_code(), Some("timeout_error"));
    assert_eq!(mock.count("login_with_redirect"), 0);
}

// =============================================================================
// handle_redirect_callback
// =============================================================================

#[tokio::test]
async fn redirect_callback_initializes_and_passes_app_state() {
    let mock = MockClient::with_user(raw_user("t1"));
    *mock.redirect_result.lock().unwrap() = Ok(Some(AppState::returning_to("/billing")));
    let store = store_with(&mock);

    let target = handle_redirect_callback(&store, "https://app.test/auth?code=a&state=b", |app_state| async move {
        app_state.and_then(|s| s.return_to)
    })
    .await
    .unwrap();

    assert_eq!(target.as_deref(), Some("/billing"));
    assert!(store.is_authenticated());
    assert_eq!(*mock.redirect_urls.lock().unwrap(), vec!["https://app.test/auth?code=a&state=b".to_owned()]);
}

#[tokio::test]
async fn redirect_callback_without_profile_settles_anonymous() {
    let mock = MockClient::new();
    let store = store_with(&mock);
    handle_redirect_callback(&store, "https://app.test/auth?code=a&state=b", |_| async {}).await.unwrap();
    assert!(!store.is_loading());
    assert!(!store.is_authenticated());
}

#[tokio::test]
async fn redirect_callback_failure_skips_callback() {
    let mock = MockClient::new();
    *mock.redirect_result.lock().unwrap() = Err(json!({ "error": "invalid_state" }));
    let store = store_with(&mock);

    let err = handle_redirect_callback(&store, "https://app.test/auth", |_| async { "unused" })
        .await
        .unwrap_err();

    assert_eq!(err.error_code(), Some("invalid_state"));
    assert!(store.is_loading());
}

// =============================================================================
// loader_with_auth
// =============================================================================

#[tokio::test]
async fn loader_with_auth_redirects_anonymous_user() {
    let mock = MockClient::new();
    let store = store_with(&mock);
    store.initialised(None);

    let redirected = loader_with_auth(&store, &RedirectLoginOptions::default(), &"/admin".into()).await.unwrap();

    assert!(redirected);
    let options = mock.login_options.lock().unwrap();
    assert_eq!(options[0].app_state.as_ref().unwrap().return_to.as_deref(), Some("/admin"));
}

#[tokio::test]
async fn loader_with_auth_is_noop_when_authenticated() {
    let mock = MockClient::new();
    let store = store_with(&mock);
    store.initialised(Some(crate::profile::decode_profile(raw_user("t1")).unwrap()));

    let redirected = loader_with_auth(&store, &RedirectLoginOptions::default(), &ReturnTo::default()).await.unwrap();

    assert!(!redirected);
    assert_eq!(mock.count("login_with_redirect"), 0);
}

// =============================================================================
// invitation_login_options
// =============================================================================

#[test]
fn invitation_options_from_query() {
    let options = invitation_login_options("?invitation=inv_1&organization=org_9&organization_name=acme").unwrap();
    assert_eq!(options.authorization_params.organization.as_deref(), Some("org_9"));
    assert_eq!(options.authorization_params.invitation.as_deref(), Some("inv_1"));
    let app_state = options.app_state.unwrap();
    assert_eq!(app_state.return_to.as_deref(), Some("/"));
    assert_eq!(app_state.is_invite_login, Some(true));
}

#[test]
fn invitation_options_decode_values() {
    let options = invitation_login_options("invitation=a%2Bb&organization=org%201").unwrap();
    assert_eq!(options.authorization_params.invitation.as_deref(), Some("a+b"));
    assert_eq!(options.authorization_params.organization.as_deref(), Some("org 1"));
}

#[test]
fn invitation_options_need_both_params() {
    assert!(invitation_login_options("?invitation=inv_1").is_none());
    assert!(invitation_login_options("?organization=org_9").is_none());
    assert!(invitation_login_options("?invitation=&organization=org_9").is_none());
    assert!(invitation_login_options("").is_none());
}

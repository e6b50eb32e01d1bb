//! Scripted stand-ins for the external client and the page location.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Value, json};

use crate::client::OAuthClient;
use crate::config::AuthConfig;
use crate::error::ClientFailure;
use crate::navigator::Navigator;
use crate::options::{
    AppState, GetTokenSilentlyOptions, IdTokenClaims, LogoutOptions, RedirectLoginOptions, RedirectLoginResult,
};
use crate::store::AuthStore;

pub const AUTHORIZE_URL: &str = "https://tenant.test/authorize?client_id=abc";

// =========================================================================
// MockClient
// =========================================================================

/// Records every call and answers from scripted values. Failures are given
/// as raw JSON and surface as `ClientFailure::Unrecognized`.
pub struct MockClient {
    pub calls: Mutex<Vec<&'static str>>,
    pub user: Mutex<Option<Value>>,
    pub user_failure: Mutex<Option<Value>>,
    pub token: Mutex<Result<String, Value>>,
    pub session_failure: Mutex<Option<Value>>,
    pub redirect_result: Mutex<Result<Option<AppState>, Value>>,
    pub claims: Mutex<Option<IdTokenClaims>>,
    pub login_options: Mutex<Vec<RedirectLoginOptions>>,
    pub logout_options: Mutex<Vec<LogoutOptions>>,
    pub token_options: Mutex<Vec<GetTokenSilentlyOptions>>,
    pub redirect_urls: Mutex<Vec<String>>,
}

impl MockClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::plain())
    }

    /// Unshared instance, for client factories.
    pub fn plain() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            user: Mutex::new(None),
            user_failure: Mutex::new(None),
            token: Mutex::new(Ok("access-token".into())),
            session_failure: Mutex::new(None),
            redirect_result: Mutex::new(Ok(None)),
            claims: Mutex::new(None),
            login_options: Mutex::new(Vec::new()),
            logout_options: Mutex::new(Vec::new()),
            token_options: Mutex::new(Vec::new()),
            redirect_urls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_user(user: Value) -> Arc<Self> {
        let mock = Self::new();
        *mock.user.lock().unwrap() = Some(user);
        mock
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == call).count()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait(?Send)]
impl OAuthClient for MockClient {
    async fn login_with_redirect(&self, options: RedirectLoginOptions) -> Result<(), ClientFailure> {
        self.record("login_with_redirect");
        let hook = options.on_redirect.clone();
        self.login_options.lock().unwrap().push(options);
        if let Some(hook) = hook {
            hook.redirect(AUTHORIZE_URL.to_owned()).await;
        }
        Ok(())
    }

    async fn logout(&self, options: LogoutOptions) -> Result<(), ClientFailure> {
        self.record("logout");
        self.logout_options.lock().unwrap().push(options);
        Ok(())
    }

    async fn get_token_silently(&self, options: GetTokenSilentlyOptions) -> Result<String, ClientFailure> {
        self.record("get_token_silently");
        self.token_options.lock().unwrap().push(options);
        self.token.lock().unwrap().clone().map_err(ClientFailure::Unrecognized)
    }

    async fn get_user(&self) -> Result<Option<Value>, ClientFailure> {
        self.record("get_user");
        if let Some(failure) = self.user_failure.lock().unwrap().clone() {
            return Err(ClientFailure::Unrecognized(failure));
        }
        Ok(self.user.lock().unwrap().clone())
    }

    async fn get_id_token_claims(&self) -> Result<Option<IdTokenClaims>, ClientFailure> {
        self.record("get_id_token_claims");
        Ok(self.claims.lock().unwrap().clone())
    }

    async fn check_session(&self) -> Result<(), ClientFailure> {
        self.record("check_session");
        match self.session_failure.lock().unwrap().clone() {
            Some(failure) => Err(ClientFailure::Unrecognized(failure)),
            None => Ok(()),
        }
    }

    async fn handle_redirect_callback(&self, url: &str) -> Result<RedirectLoginResult, ClientFailure> {
        self.record("handle_redirect_callback");
        self.redirect_urls.lock().unwrap().push(url.to_owned());
        self.redirect_result
            .lock()
            .unwrap()
            .clone()
            .map(|app_state| RedirectLoginResult { app_state })
            .map_err(ClientFailure::Unrecognized)
    }
}

// =========================================================================
// MockNavigator
// =========================================================================

pub struct MockNavigator {
    pub origin: String,
    pub pathname: String,
    pub search: String,
    pub replaced_states: Mutex<Vec<String>>,
    pub replaced_locations: Mutex<Vec<String>>,
    pub stalls: Mutex<Vec<Duration>>,
}

impl MockNavigator {
    pub fn at(pathname: &str, search: &str) -> Arc<Self> {
        Arc::new(Self {
            origin: "https://app.test".into(),
            pathname: pathname.into(),
            search: search.into(),
            replaced_states: Mutex::new(Vec::new()),
            replaced_locations: Mutex::new(Vec::new()),
            stalls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait::async_trait(?Send)]
impl Navigator for MockNavigator {
    fn href(&self) -> String {
        format!("{}{}{}", self.origin, self.pathname, self.search)
    }

    fn pathname(&self) -> String {
        self.pathname.clone()
    }

    fn search(&self) -> String {
        self.search.clone()
    }

    fn replace_state(&self, path: &str) {
        self.replaced_states.lock().unwrap().push(path.to_owned());
    }

    fn replace_location(&self, url: &str) {
        self.replaced_locations.lock().unwrap().push(url.to_owned());
    }

    async fn stall(&self, duration: Duration) {
        self.stalls.lock().unwrap().push(duration);
    }
}

// =========================================================================
// Fixtures
// =========================================================================

/// Send tracing output to the test harness. Idempotent.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().with_max_level(tracing::Level::DEBUG).try_init();
}

pub fn test_config() -> AuthConfig {
    AuthConfig::new("tenant.test", "abc").with_redirect_uri("https://app.test/auth")
}

pub fn store_with(mock: &Arc<MockClient>) -> AuthStore {
    AuthStore::with_client(test_config(), Arc::clone(mock) as Arc<dyn OAuthClient>)
}

/// Raw snake_case profile as the external client returns it.
pub fn raw_user(updated_at: &str) -> Value {
    json!({
        "sub": "auth0|123",
        "given_name": "Ada",
        "family_name": "Lovelace",
        "email": "ada@example.com",
        "updated_at": updated_at,
        "org_id": "org_abc",
        "app_metadata": { "plan_tier": "pro" }
    })
}

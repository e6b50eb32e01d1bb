//! `Navigator` backed by `window.location` and `window.history`.

use std::time::Duration;

use authsync::Navigator;
use tracing::warn;
use wasm_bindgen::JsValue;

/// The page the app is running in.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserNavigator;

fn location() -> Option<web_sys::Location> {
    web_sys::window().map(|w| w.location())
}

#[async_trait::async_trait(?Send)]
impl Navigator for BrowserNavigator {
    fn href(&self) -> String {
        location().and_then(|l| l.href().ok()).unwrap_or_default()
    }

    fn pathname(&self) -> String {
        location().and_then(|l| l.pathname().ok()).unwrap_or_else(|| "/".to_owned())
    }

    fn search(&self) -> String {
        location().and_then(|l| l.search().ok()).unwrap_or_default()
    }

    fn replace_state(&self, path: &str) {
        let Some(history) = web_sys::window().and_then(|w| w.history().ok()) else {
            return;
        };
        if let Err(err) = history.replace_state_with_url(&JsValue::NULL, "", Some(path)) {
            warn!(?err, path, "history.replaceState failed");
        }
    }

    fn replace_location(&self, url: &str) {
        let Some(location) = location() else {
            return;
        };
        if let Err(err) = location.replace(url) {
            warn!(?err, "location.replace failed");
        }
    }

    async fn stall(&self, duration: Duration) {
        gloo_timers::future::sleep(duration).await;
    }
}

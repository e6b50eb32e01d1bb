//! Seam to the page location and history.
//!
//! The orchestrator reads the current location to spot a returning
//! authorization redirect and rewrites the history entry afterwards; loader
//! policies perform a full-page navigation and then hold until the browser
//! has left the page.

use std::time::Duration;

#[async_trait::async_trait(?Send)]
pub trait Navigator: Send + Sync {
    /// Full current URL.
    fn href(&self) -> String;

    /// Path component of the current URL.
    fn pathname(&self) -> String;

    /// Query string of the current URL, including the leading `?` if present.
    fn search(&self) -> String;

    /// Replace the current history entry without navigating.
    fn replace_state(&self, path: &str);

    /// Full-page navigation that replaces the current history entry.
    fn replace_location(&self, url: &str);

    /// Resolve after `duration`.
    async fn stall(&self, duration: Duration);
}

//! # authsync-leptos
//!
//! Leptos bindings for the `authsync` session store. `AuthProvider` puts the
//! store in context, mirrors its snapshot into a signal and runs the one-shot
//! bootstrap on mount. `AuthRequired` gates a subtree on the session.
//!
//! Browser-only pieces (`BrowserNavigator`, `init_logging`) are behind the
//! `hydrate` feature.

#[cfg(feature = "hydrate")]
pub mod browser;
pub mod gate;
pub mod hooks;
#[cfg(feature = "hydrate")]
pub mod logging;
pub mod provider;

#[cfg(feature = "hydrate")]
pub use browser::BrowserNavigator;
pub use gate::AuthRequired;
pub use hooks::{AuthContext, use_auth, use_auth_error, use_auth_state, use_auth_store, use_is_authenticated, use_is_loading, use_user};
#[cfg(feature = "hydrate")]
pub use logging::init_logging;
pub use provider::AuthProvider;

//! # authsync
//!
//! Auth state synchronization between an external OAuth/OIDC client SDK and
//! a reactive UI. The external client owns the protocol (redirects, PKCE,
//! token exchange, refresh rotation, token cache); this crate owns the state
//! contract around it:
//!
//! - [`store::AuthStore`]: session snapshot plus the login/logout/token actions
//! - [`init::Initializer`]: one-shot redirect/session bootstrap
//! - [`policy`]: loader-side authorization policies
//! - [`gate::AuthGate`]: decision logic for declarative route guards
//!
//! The Leptos bindings live in the sibling `authsync-leptos` crate.

pub mod case;
pub mod client;
pub mod config;
pub mod error;
pub mod gate;
pub mod init;
pub mod navigator;
pub mod options;
pub mod policy;
pub mod profile;
pub mod store;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use client::OAuthClient;
pub use config::AuthConfig;
pub use error::{AuthError, ClientFailure};
pub use gate::{AuthGate, GateStatus};
pub use init::Initializer;
pub use navigator::Navigator;
pub use options::{AppState, AuthorizationParams, GetTokenSilentlyOptions, LogoutOptions, RedirectLoginOptions};
pub use policy::{Authorized, ReturnTo};
pub use profile::{Profile, User};
pub use store::{AuthSnapshot, AuthStore};

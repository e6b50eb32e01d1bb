//! User profile types exposed to consumers.
//!
//! DESIGN
//! ======
//! The external client returns the raw OIDC profile as JSON with snake_case
//! keys. It is camelized first and only then decoded, so a `Profile` type
//! always deserializes from camelCase. `User` covers the standard claims and
//! keeps everything else in `extra`; applications with custom claims can
//! bring their own `Profile` type instead.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::case::camelize_keys;
use crate::error::AuthError;

/// A user record the store can hold.
pub trait Profile: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Last-modified timestamp used to skip redundant store updates.
    fn updated_at(&self) -> Option<&str>;
}

/// Standard OIDC profile claims, camelCased, plus any extra claims.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoneinfo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number_verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Custom claims (namespaced claims, `orgId`, `connection`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Look up a custom claim by its camelCase key.
    #[must_use]
    pub fn claim(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

impl Profile for User {
    fn updated_at(&self) -> Option<&str> {
        self.updated_at.as_deref()
    }
}

/// Camelize a raw external profile and decode it into `U`.
///
/// # Errors
///
/// Returns [`AuthError::Profile`] if the camelized payload does not fit `U`.
pub fn decode_profile<U: Profile>(raw: Value) -> Result<U, AuthError> {
    Ok(serde_json::from_value(camelize_keys(raw))?)
}

/// Shallow-merge the top-level fields of `patch` onto `current`.
///
/// A missing `current` merges onto an empty record. Non-object patches
/// contribute nothing.
///
/// # Errors
///
/// Returns [`AuthError::Profile`] if either side cannot round-trip through
/// JSON as `U`.
pub fn merge_profile<U: Profile>(current: Option<&U>, patch: Value) -> Result<U, AuthError> {
    let mut base = match current {
        Some(user) => match serde_json::to_value(user)? {
            Value::Object(map) => map,
            _ => Map::new(),
        },
        None => Map::new(),
    };
    if let Value::Object(fields) = patch {
        base.extend(fields);
    }
    Ok(serde_json::from_value(Value::Object(base))?)
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;

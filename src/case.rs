//! snake_case → camelCase key rewriting for external profile payloads.
//!
//! The external SDK hands out OIDC claims with snake_case keys
//! (`given_name`, `updated_at`, ...). Consumers only ever see camelCase, at
//! every nesting level. Sets have no JSON form of their own and arrive as
//! arrays, so they are covered by the array branch.

use serde_json::{Map, Value};

/// Rewrite one key: a run of `_` / `-` followed by an ASCII alphanumeric is
/// dropped and that character uppercased. A run with nothing alphanumeric
/// after it is kept as is, so applying this twice changes nothing.
#[must_use]
pub fn snake_to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut run = String::new();
    for c in key.chars() {
        if c == '_' || c == '-' {
            run.push(c);
        } else if run.is_empty() {
            out.push(c);
        } else if c.is_ascii_alphanumeric() {
            run.clear();
            out.push(c.to_ascii_uppercase());
        } else {
            out.push_str(&run);
            run.clear();
            out.push(c);
        }
    }
    out.push_str(&run);
    out
}

/// Recursively camelize every object key inside `value`.
#[must_use]
pub fn camelize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(camelize_map(map)),
        Value::Array(items) => Value::Array(items.into_iter().map(camelize_keys).collect()),
        scalar => scalar,
    }
}

/// Camelize the keys of one object, recursing into its values.
#[must_use]
pub fn camelize_map(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .map(|(key, val)| (snake_to_camel(&key), camelize_keys(val)))
        .collect()
}

#[cfg(test)]
#[path = "case_test.rs"]
mod tests;

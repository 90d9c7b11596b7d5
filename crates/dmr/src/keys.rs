//! Key transcoding between declaration documents and the wire model.
//!
//! Declaration formats can't always express hyphens or dots in keys, so
//! documents use underscores and hashes instead. `unescape_keys` rewrites
//! a declared document into wire form; `escape_keys` goes the other way
//! and additionally collapses single-key `EXPRESSION_VALUE` wrappers into
//! their raw placeholder string.

use serde_json::{Map, Value as Json};

use crate::value::EXPRESSION_VALUE_KEY;

/// Document form to wire form: `_` becomes `-`, `#` becomes `.`.
/// Values are untouched; only object keys are rewritten, recursively.
pub fn unescape_keys(value: &Json) -> Json {
    match value {
        Json::Object(map) => Json::Object(
            map.iter()
                .map(|(key, val)| (key.replace('_', "-").replace('#', "."), unescape_keys(val)))
                .collect(),
        ),
        Json::Array(items) => Json::Array(items.iter().map(unescape_keys).collect()),
        other => other.clone(),
    }
}

/// Wire form to document form: `-` becomes `_`, `.` becomes `#`, and a
/// single-key expression wrapper collapses to its inner string.
pub fn escape_keys(value: &Json) -> Json {
    match value {
        Json::Object(map) => {
            if map.len() == 1 {
                if let Some(expr @ Json::String(_)) = map.get(EXPRESSION_VALUE_KEY) {
                    return expr.clone();
                }
            }
            Json::Object(
                map.iter()
                    .map(|(key, val)| (key.replace('-', "_").replace('.', "#"), escape_keys(val)))
                    .collect::<Map<_, _>>(),
            )
        }
        Json::Array(items) => Json::Array(items.iter().map(escape_keys).collect()),
        other => other.clone(),
    }
}

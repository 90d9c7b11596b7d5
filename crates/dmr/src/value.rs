//! Typed view of management model nodes.
//!
//! The CLI bridge returns operation results as JSON. [`ModelValue`]
//! decodes that payload into the model's own type system so the rest of
//! the crate can match on node types exhaustively instead of sniffing
//! JSON shapes at every call site.

use indexmap::IndexMap;
use serde_json::Value as Json;

/// Sentinel key the JSON encoding uses for expression nodes.
pub const EXPRESSION_VALUE_KEY: &str = "EXPRESSION_VALUE";

/// A management model node.
///
/// `Int` and `Long` both carry an `i64`; the distinction mirrors the
/// server's node types and matters only for coercion diagnostics.
/// Object nodes keep the server's key order, which the ordered child
/// synchronization relies on.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelValue {
    Undefined,
    Int(i64),
    Long(i64),
    Str(String),
    Bool(bool),
    /// An unresolved `${...}` placeholder, stored as its raw text.
    Expression(String),
    List(Vec<ModelValue>),
    Object(IndexMap<String, ModelValue>),
}

impl ModelValue {
    /// Decode a JSON payload into a model node.
    ///
    /// Expression nodes arrive either as a single-key
    /// `{"EXPRESSION_VALUE": "${...}"}` object or, from older bridges,
    /// as a plain string still containing the placeholder syntax; both
    /// forms decode to [`ModelValue::Expression`].
    pub fn from_json(value: &Json) -> Self {
        match value {
            Json::Null => ModelValue::Undefined,
            Json::Bool(b) => ModelValue::Bool(*b),
            Json::Number(n) => match n.as_i64() {
                Some(i) if i64::from(i32::MIN) <= i && i <= i64::from(i32::MAX) => {
                    ModelValue::Int(i)
                }
                Some(i) => ModelValue::Long(i),
                // Fractional node types are not part of the managed
                // configuration surface; carry them as text.
                None => ModelValue::Str(n.to_string()),
            },
            Json::String(s) => {
                if s.contains("${") {
                    ModelValue::Expression(s.clone())
                } else {
                    ModelValue::Str(s.clone())
                }
            }
            Json::Array(items) => {
                ModelValue::List(items.iter().map(ModelValue::from_json).collect())
            }
            Json::Object(map) => {
                if map.len() == 1 {
                    if let Some(Json::String(expr)) = map.get(EXPRESSION_VALUE_KEY) {
                        return ModelValue::Expression(expr.clone());
                    }
                }
                ModelValue::Object(
                    map.iter()
                        .map(|(k, v)| (k.clone(), ModelValue::from_json(v)))
                        .collect(),
                )
            }
        }
    }

    /// Re-encode as JSON, for change records and diagnostics.
    /// Expressions flatten back to their raw placeholder text.
    pub fn to_json(&self) -> Json {
        match self {
            ModelValue::Undefined => Json::Null,
            ModelValue::Int(i) | ModelValue::Long(i) => Json::from(*i),
            ModelValue::Str(s) | ModelValue::Expression(s) => Json::String(s.clone()),
            ModelValue::Bool(b) => Json::Bool(*b),
            ModelValue::List(items) => Json::Array(items.iter().map(ModelValue::to_json).collect()),
            ModelValue::Object(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Member lookup on object nodes. `None` for any other node type.
    pub fn get(&self, key: &str) -> Option<&ModelValue> {
        match self {
            ModelValue::Object(map) => map.get(key),
            _ => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, ModelValue::Undefined)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ModelValue::Str(s) | ModelValue::Expression(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ModelValue::Int(i) | ModelValue::Long(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ModelValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, ModelValue>> {
        match self {
            ModelValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// The node type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            ModelValue::Undefined => "UNDEFINED",
            ModelValue::Int(_) => "INT",
            ModelValue::Long(_) => "LONG",
            ModelValue::Str(_) => "STRING",
            ModelValue::Bool(_) => "BOOLEAN",
            ModelValue::Expression(_) => "EXPRESSION",
            ModelValue::List(_) => "LIST",
            ModelValue::Object(_) => "OBJECT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_decoding() {
        assert_eq!(ModelValue::from_json(&json!(null)), ModelValue::Undefined);
        assert_eq!(ModelValue::from_json(&json!(true)), ModelValue::Bool(true));
        assert_eq!(ModelValue::from_json(&json!(5432)), ModelValue::Int(5432));
        assert_eq!(
            ModelValue::from_json(&json!(30_000_000_000_i64)),
            ModelValue::Long(30_000_000_000)
        );
        assert_eq!(
            ModelValue::from_json(&json!("jdbc:h2:mem:test")),
            ModelValue::Str("jdbc:h2:mem:test".to_string())
        );
    }

    #[test]
    fn test_expression_object_collapses() {
        let node = ModelValue::from_json(&json!({"EXPRESSION_VALUE": "${jboss.bind.address:127.0.0.1}"}));
        assert_eq!(
            node,
            ModelValue::Expression("${jboss.bind.address:127.0.0.1}".to_string())
        );
    }

    #[test]
    fn test_plain_string_with_placeholder_is_expression() {
        let node = ModelValue::from_json(&json!("${env.PORT:8080}"));
        assert_eq!(node, ModelValue::Expression("${env.PORT:8080}".to_string()));
    }

    #[test]
    fn test_object_preserves_member_order() {
        let node = ModelValue::from_json(&json!({"UDP": {}, "PING": {}, "MERGE3": {}}));
        let keys: Vec<&str> = node.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["UDP", "PING", "MERGE3"]);
    }

    #[test]
    fn test_json_round_trip_flattens_expression() {
        let node = ModelValue::Expression("${x:1}".to_string());
        assert_eq!(node.to_json(), json!("${x:1}"));
    }

    #[test]
    fn test_member_lookup() {
        let node = ModelValue::from_json(&json!({"port": 8080, "interface": null}));
        assert_eq!(node.get("port"), Some(&ModelValue::Int(8080)));
        assert_eq!(node.get("interface"), Some(&ModelValue::Undefined));
        assert_eq!(node.get("missing"), None);
    }
}

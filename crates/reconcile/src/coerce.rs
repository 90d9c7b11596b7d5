//! Type-aware coercion of declared values against live model nodes.
//!
//! Before two values can be compared they must land in a common shape:
//! the live node's type decides how the declared JSON value is read, so
//! `"20"` declared against an INT attribute compares as the number 20,
//! and `true` declared against a BOOLEAN attribute never trips over the
//! string `"true"`. Both sides come out as [`Comparable`] values.

use std::sync::LazyLock;

use dmr::{Error, ModelValue, Result};
use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value as Json;

/// Matches a `${...}` placeholder, tolerating quoting and an
/// `expression` prefix left over from hand-written declarations.
static EXPRESSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^['"]?(?:expression\s*)?['"]?(.*\$\{.*\}[^'"]*)['"]*$"#).expect("valid pattern")
});

/// A value normalized for comparison.
///
/// `Int` covers both INT and LONG live nodes; expressions are reduced
/// to their placeholder text as `Str`. Map equality ignores member
/// order, list equality does not (list synchronization compares as a
/// multiset instead, see [`multiset_eq`]).
#[derive(Debug, Clone, PartialEq)]
pub enum Comparable {
    None,
    Int(i64),
    Str(String),
    Bool(bool),
    List(Vec<Comparable>),
    Map(IndexMap<String, Comparable>),
}

impl Comparable {
    pub fn is_none(&self) -> bool {
        matches!(self, Comparable::None)
    }

    /// Re-encode for change records.
    pub fn to_json(&self) -> Json {
        match self {
            Comparable::None => Json::Null,
            Comparable::Int(i) => Json::from(*i),
            Comparable::Str(s) => Json::String(s.clone()),
            Comparable::Bool(b) => Json::Bool(*b),
            Comparable::List(items) => {
                Json::Array(items.iter().map(Comparable::to_json).collect())
            }
            Comparable::Map(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Recursively flatten scalars to their string form, booleans
    /// lowercase. Object comparison works on this representation so a
    /// live `20` and a declared `"20"` inside a nested object agree.
    pub fn stringified(&self) -> Comparable {
        match self {
            Comparable::None => Comparable::None,
            Comparable::Int(i) => Comparable::Str(i.to_string()),
            Comparable::Str(s) => Comparable::Str(s.clone()),
            Comparable::Bool(b) => Comparable::Str(b.to_string()),
            Comparable::List(items) => {
                Comparable::List(items.iter().map(Comparable::stringified).collect())
            }
            Comparable::Map(map) => Comparable::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.stringified()))
                    .collect(),
            ),
        }
    }
}

/// Strip quoting and an `expression` prefix from a declared placeholder,
/// leaving the raw `${...}` text. Non-placeholder strings pass through.
pub fn unwrap_expression(raw: &str) -> String {
    EXPRESSION_PATTERN
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map_or_else(|| raw.to_string(), |m| m.as_str().to_string())
}

/// Order-insensitive, duplicate-sensitive list equality.
pub fn multiset_eq(left: &[Comparable], right: &[Comparable]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    let mut remaining: Vec<&Comparable> = right.iter().collect();
    for item in left {
        match remaining.iter().position(|candidate| *candidate == item) {
            Some(pos) => {
                remaining.swap_remove(pos);
            }
            None => return false,
        }
    }
    true
}

/// Coerce a live node and its declared counterpart to comparable form.
///
/// `declared` of `None` (or JSON null) means the attribute is declared
/// for deletion and coerces to [`Comparable::None`]. A declared value
/// whose shape cannot be read as the live node's type is a parameter
/// error naming the attribute.
pub fn coerce(
    attribute: &str,
    live: &ModelValue,
    declared: Option<&Json>,
) -> Result<(Comparable, Comparable)> {
    let declared = declared.filter(|value| !value.is_null());
    let old = from_live(live);
    let new = match (live, declared) {
        (_, None) => Comparable::None,
        (ModelValue::Undefined, Some(Json::Object(_))) => {
            // Container attributes read back as undefined even when the
            // nested resource exists; declaring one here cannot be
            // compared, so it is treated as already converged.
            log::debug!("attribute {attribute} is undefined in the model, skipping declared container value");
            Comparable::None
        }
        (ModelValue::Undefined, Some(value)) => from_declared(value),
        (ModelValue::Int(_) | ModelValue::Long(_), Some(value)) => {
            coerce_int(attribute, value)?
        }
        (ModelValue::Str(_), Some(value)) => coerce_str(attribute, value)?,
        (ModelValue::Bool(_), Some(value)) => coerce_bool(attribute, value)?,
        (ModelValue::Expression(_), Some(value)) => match value {
            Json::String(s) => Comparable::Str(unwrap_expression(s)),
            other => {
                return Err(Error::Parameter(format!(
                    "expression attribute {attribute} must be declared as a string, got {other}"
                )));
            }
        },
        (ModelValue::List(_), Some(value)) => match value {
            Json::Array(_) => from_declared(value),
            other => {
                return Err(Error::Parameter(format!(
                    "list attribute {attribute} must be declared as a list, got {other}"
                )));
            }
        },
        (ModelValue::Object(_), Some(value)) => match value {
            Json::Object(_) => from_declared(value),
            other => {
                return Err(Error::Parameter(format!(
                    "object attribute {attribute} must be declared as a mapping, got {other}"
                )));
            }
        },
    };
    Ok((old, new))
}

fn coerce_int(attribute: &str, value: &Json) -> Result<Comparable> {
    match value {
        Json::Number(n) => n.as_i64().map(Comparable::Int).ok_or_else(|| {
            Error::Parameter(format!("cannot convert {n} to an integer for attribute {attribute}"))
        }),
        Json::String(s) => s.trim().parse::<i64>().map(Comparable::Int).map_err(|_| {
            Error::Parameter(format!("cannot convert '{s}' to an integer for attribute {attribute}"))
        }),
        other => Err(Error::Parameter(format!(
            "cannot convert {other} to an integer for attribute {attribute}"
        ))),
    }
}

fn coerce_str(attribute: &str, value: &Json) -> Result<Comparable> {
    match value {
        Json::String(s) => Ok(Comparable::Str(unwrap_expression(s))),
        Json::Number(n) => Ok(Comparable::Str(n.to_string())),
        Json::Bool(b) => Ok(Comparable::Str(b.to_string())),
        other => Err(Error::Parameter(format!(
            "cannot convert {other} to a string for attribute {attribute}"
        ))),
    }
}

fn coerce_bool(attribute: &str, value: &Json) -> Result<Comparable> {
    match value {
        Json::Bool(b) => Ok(Comparable::Bool(*b)),
        Json::String(s) => match s.to_lowercase().as_str() {
            "true" => Ok(Comparable::Bool(true)),
            "false" => Ok(Comparable::Bool(false)),
            _ => Err(Error::Parameter(format!(
                "cannot convert '{s}' to a boolean for attribute {attribute}"
            ))),
        },
        Json::Number(n) => match n.as_i64() {
            Some(1) => Ok(Comparable::Bool(true)),
            Some(0) => Ok(Comparable::Bool(false)),
            _ => Err(Error::Parameter(format!(
                "cannot convert {n} to a boolean for attribute {attribute}"
            ))),
        },
        other => Err(Error::Parameter(format!(
            "cannot convert {other} to a boolean for attribute {attribute}"
        ))),
    }
}

/// Structural conversion of a live node, used for nested values where
/// no declared counterpart steers the reading.
pub fn from_live(node: &ModelValue) -> Comparable {
    match node {
        ModelValue::Undefined => Comparable::None,
        ModelValue::Int(i) | ModelValue::Long(i) => Comparable::Int(*i),
        ModelValue::Str(s) => Comparable::Str(s.clone()),
        ModelValue::Bool(b) => Comparable::Bool(*b),
        ModelValue::Expression(e) => Comparable::Str(unwrap_expression(e)),
        ModelValue::List(items) => Comparable::List(items.iter().map(from_live).collect()),
        ModelValue::Object(map) => Comparable::Map(
            map.iter()
                .map(|(k, v)| (k.clone(), from_live(v)))
                .collect(),
        ),
    }
}

/// Structural conversion of a declared JSON value.
pub fn from_declared(value: &Json) -> Comparable {
    match value {
        Json::Null => Comparable::None,
        Json::Bool(b) => Comparable::Bool(*b),
        Json::Number(n) => n
            .as_i64()
            .map_or_else(|| Comparable::Str(n.to_string()), Comparable::Int),
        Json::String(s) => Comparable::Str(unwrap_expression(s)),
        Json::Array(items) => Comparable::List(items.iter().map(from_declared).collect()),
        Json::Object(map) => Comparable::Map(
            map.iter()
                .map(|(k, v)| (k.clone(), from_declared(v)))
                .collect(),
        ),
    }
}

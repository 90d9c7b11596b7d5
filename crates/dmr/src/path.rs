//! Resource addresses and the management command grammar.
//!
//! Commands sent to the CLI bridge are a resource path followed by an
//! operation and its arguments: `/subsystem=datasources/data-source=X:add(...)`.
//! [`ResourcePath`] and [`Command`] build those strings from typed parts;
//! [`PathTemplate`] is an address with unbound name slots, bound per
//! resource by the reconciliation layer.

use std::fmt;

use serde_json::Value as Json;

use crate::error::{Error, Result};

/// A fully-addressed resource: an ordered list of `key=name` segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePath {
    segments: Vec<(String, String)>,
}

impl ResourcePath {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Append a `key=name` segment, builder style.
    pub fn child(mut self, key: &str, name: &str) -> Self {
        self.segments.push((key.to_string(), name.to_string()));
        self
    }

    /// Name of the final segment, if any.
    pub fn leaf_name(&self) -> Option<&str> {
        self.segments.last().map(|(_, name)| name.as_str())
    }
}

impl Default for ResourcePath {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, name) in &self.segments {
            write!(f, "/{key}={name}")?;
        }
        Ok(())
    }
}

/// A resource address with placeholder name slots.
///
/// Fixed segments carry their name; wildcard segments take theirs from
/// [`PathTemplate::bind`], in declaration order.
#[derive(Debug, Clone)]
pub struct PathTemplate {
    segments: Vec<(String, Option<String>)>,
}

impl PathTemplate {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    pub fn fixed(mut self, key: &str, name: &str) -> Self {
        self.segments.push((key.to_string(), Some(name.to_string())));
        self
    }

    pub fn wildcard(mut self, key: &str) -> Self {
        self.segments.push((key.to_string(), None));
        self
    }

    /// Number of unbound name slots.
    pub fn arity(&self) -> usize {
        self.segments.iter().filter(|(_, n)| n.is_none()).count()
    }

    /// Bind the wildcard slots in order, producing a concrete address.
    pub fn bind(&self, names: &[&str]) -> Result<ResourcePath> {
        if names.len() != self.arity() {
            return Err(Error::Parameter(format!(
                "path template expects {} name(s), got {}",
                self.arity(),
                names.len()
            )));
        }
        let mut names = names.iter();
        let mut path = ResourcePath::new();
        for (key, fixed) in &self.segments {
            let name = match fixed {
                Some(name) => name.as_str(),
                // arity was checked above
                None => names.next().map_or("", |n| n),
            };
            path = path.child(key, name);
        }
        Ok(path)
    }
}

impl Default for PathTemplate {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode an argument value in the form the CLI bridge accepts.
///
/// This is plain compact JSON: strings quoted and escaped, booleans
/// lowercase, nested lists and objects verbatim.
pub fn encode_value(value: &Json) -> String {
    // Json serialization of Json values cannot fail.
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

/// Render `key=value` pairs as an argument list fragment,
/// comma-and-space separated.
pub fn encode_params<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a Json)>,
{
    pairs
        .into_iter()
        .map(|(key, value)| format!("{key}={}", encode_value(value)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Builder for one management command string.
#[derive(Debug)]
pub struct Command<'a> {
    path: &'a ResourcePath,
    operation: &'a str,
    args: Vec<String>,
}

impl<'a> Command<'a> {
    pub fn new(path: &'a ResourcePath, operation: &'a str) -> Self {
        Self {
            path,
            operation,
            args: Vec::new(),
        }
    }

    /// Add a `name=value` argument with JSON value encoding.
    pub fn arg(mut self, name: &str, value: &Json) -> Self {
        self.args.push(format!("{name}={}", encode_value(value)));
        self
    }

    /// Add a pre-rendered argument fragment.
    pub fn raw_args(mut self, fragment: &str) -> Self {
        if !fragment.is_empty() {
            self.args.push(fragment.to_string());
        }
        self
    }

    pub fn render(&self) -> String {
        format!("{}:{}({})", self.path, self.operation, self.args.join(", "))
    }
}

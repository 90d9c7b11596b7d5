//! Declared resource specifications.
//!
//! A [`ResourceSpec`] is one resource's declared configuration: a JSON
//! mapping whose `state` member selects the goal state and whose `name`
//! member (when the resource is not a fixed singleton) addresses it.

use dmr::{Error, Result};
use serde_json::{Map, Value as Json};

/// Goal state of a declared resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesiredState {
    Present,
    Absent,
}

/// One declared resource configuration.
#[derive(Debug, Clone)]
pub struct ResourceSpec {
    fields: Map<String, Json>,
}

impl ResourceSpec {
    /// Wrap a declared mapping. Anything that is not a mapping is a
    /// parameter error.
    pub fn from_value(value: &Json) -> Result<Self> {
        match value {
            Json::Object(map) => Ok(Self {
                fields: map.clone(),
            }),
            other => Err(Error::Parameter(format!(
                "resource configuration must be a mapping, got {other}"
            ))),
        }
    }

    /// Interpret a declared section as a list of specs: a single mapping
    /// counts as a one-element list.
    pub fn list_from(value: &Json) -> Result<Vec<Self>> {
        match value {
            Json::Array(items) => items.iter().map(Self::from_value).collect(),
            Json::Object(_) => Ok(vec![Self::from_value(value)?]),
            other => Err(Error::Parameter(format!(
                "expected a resource mapping or a list of them, got {other}"
            ))),
        }
    }

    /// The declared goal state. Missing means present; anything besides
    /// `present`/`absent` is rejected.
    pub fn state(&self) -> Result<DesiredState> {
        match self.fields.get("state") {
            None | Some(Json::Null) => Ok(DesiredState::Present),
            Some(Json::String(s)) if s == "present" => Ok(DesiredState::Present),
            Some(Json::String(s)) if s == "absent" => Ok(DesiredState::Absent),
            Some(other) => Err(Error::Parameter(format!(
                "state must be one of [present, absent], got {other}"
            ))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Json> {
        self.fields.get(key)
    }

    pub fn str_param(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Json::as_str)
    }

    /// A required string parameter; absence is a parameter error.
    pub fn require_str(&self, key: &str) -> Result<&str> {
        self.str_param(key)
            .ok_or_else(|| Error::Parameter(format!("the parameter {key} is undefined")))
    }

    /// Iterate members in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Json)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// A copy without the given members, for stripping structural keys
    /// before handing the spec to a generic consumer.
    pub fn without(&self, keys: &[&str]) -> Self {
        Self {
            fields: self
                .fields
                .iter()
                .filter(|(k, _)| !keys.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

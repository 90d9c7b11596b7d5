//! Change reporting.
//!
//! Every mutation the engine performs is recorded. A [`ChangeRecord`]
//! covers one resource and serializes with the resource kind as the
//! identifying key, `{"datasource": "TestDS", "action": "add", ...}`,
//! so reports read naturally per resource type. The per-section records
//! roll up into a [`ChangeTree`] keyed by configuration section.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value as Json;

/// What happened to a resource or attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Add,
    Update,
    Delete,
}

/// One attribute-level mutation.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AttributeChange {
    pub attribute: String,
    pub action: Action,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Json>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Json>,
}

impl AttributeChange {
    pub fn added(attribute: &str, new_value: Json) -> Self {
        Self {
            attribute: attribute.to_string(),
            action: Action::Add,
            old_value: None,
            new_value: Some(new_value),
        }
    }

    pub fn updated(attribute: &str, old_value: Json, new_value: Json) -> Self {
        Self {
            attribute: attribute.to_string(),
            action: Action::Update,
            old_value: Some(old_value),
            new_value: Some(new_value),
        }
    }

    pub fn deleted(attribute: &str, old_value: Json) -> Self {
        Self {
            attribute: attribute.to_string(),
            action: Action::Delete,
            old_value: Some(old_value),
            new_value: None,
        }
    }
}

/// One resource-level mutation, with its attribute changes when the
/// resource was updated in place and its creation parameters when it
/// was added.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRecord {
    pub kind: String,
    pub identifier: String,
    pub action: Action,
    pub params: Option<String>,
    pub changes: Vec<AttributeChange>,
}

impl ChangeRecord {
    pub fn new(kind: &str, identifier: &str, action: Action) -> Self {
        Self {
            kind: kind.to_string(),
            identifier: identifier.to_string(),
            action,
            params: None,
            changes: Vec::new(),
        }
    }

    pub fn with_params(mut self, params: String) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_changes(mut self, changes: Vec<AttributeChange>) -> Self {
        self.changes = changes;
        self
    }
}

impl Serialize for ChangeRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(&self.kind, &self.identifier)?;
        map.serialize_entry("action", &self.action)?;
        if let Some(params) = &self.params {
            map.serialize_entry("params", params)?;
        }
        if !self.changes.is_empty() {
            map.serialize_entry("changes", &self.changes)?;
        }
        map.end()
    }
}

/// Change records grouped by configuration section, in document order.
pub type ChangeTree = IndexMap<String, Vec<ChangeRecord>>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_record_shape() {
        let record = ChangeRecord::new("datasource", "TestDS", Action::Add)
            .with_params("connection-url=\"jdbc:h2:mem:test\"".to_string());
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "datasource": "TestDS",
                "action": "add",
                "params": "connection-url=\"jdbc:h2:mem:test\""
            })
        );
    }

    #[test]
    fn test_update_record_shape() {
        let record = ChangeRecord::new("datasource", "ExampleDS", Action::Update).with_changes(
            vec![AttributeChange::updated(
                "connection-url",
                json!("jdbc:h2:mem:test"),
                json!("jdbc:h2:mem:update"),
            )],
        );
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "datasource": "ExampleDS",
                "action": "update",
                "changes": [{
                    "attribute": "connection-url",
                    "action": "update",
                    "old_value": "jdbc:h2:mem:test",
                    "new_value": "jdbc:h2:mem:update"
                }]
            })
        );
    }

    #[test]
    fn test_delete_record_omits_empty_members() {
        let record = ChangeRecord::new("jdbc-driver", "h2", Action::Delete);
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"jdbc-driver": "h2", "action": "delete"})
        );
    }
}

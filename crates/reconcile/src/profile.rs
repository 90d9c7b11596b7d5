//! Resource profiles.
//!
//! A [`ResourceProfile`] describes one manageable resource type: where
//! it lives, which attributes it accepts, and which declared keys name
//! child resources. Subsystem modules build their profiles by
//! composition, extending a base profile's attribute set instead of
//! inheriting behavior.

use dmr::PathTemplate;
use serde_json::Value as Json;

use crate::changes::ChangeRecord;

/// Module-specific child handling: receives the client, the names bound
/// into the parent path so far, and the declared child section.
pub type ChildHandler =
    fn(&dyn dmr::ManagementClient, &[&str], &Json) -> dmr::Result<Vec<ChangeRecord>>;

/// How a declared child key is synchronized.
#[derive(Clone)]
pub enum ChildKind {
    /// A named child collection: a mapping or list of full resource
    /// specs, each carrying `name` and optionally `state`.
    Collection(ResourceProfile),
    /// A singleton child configuration object: a mapping means present,
    /// an explicit null means absent.
    Component(ResourceProfile),
    /// Anything the generic lifecycle can't express.
    Custom(ChildHandler),
}

/// One resource type's shape.
#[derive(Clone)]
pub struct ResourceProfile {
    /// Change-record kind, e.g. `datasource`.
    pub kind: &'static str,
    /// Address template; wildcards are bound from ancestry plus the
    /// resource's own name.
    pub template: PathTemplate,
    /// Fixed resource name for singletons addressed by a constant
    /// segment instead of a declared `name`.
    pub fixed_name: Option<&'static str>,
    /// Attributes accepted by the declared configuration.
    pub allowed: Vec<&'static str>,
    /// Declared keys naming child resources.
    pub children: Vec<(&'static str, ChildKind)>,
    /// Extra declared keys that are structural rather than attributes
    /// (consumed by the caller, e.g. a containing group name).
    pub structural: Vec<&'static str>,
}

impl ResourceProfile {
    pub fn new(kind: &'static str, template: PathTemplate) -> Self {
        Self {
            kind,
            template,
            fixed_name: None,
            allowed: Vec::new(),
            children: Vec::new(),
            structural: Vec::new(),
        }
    }

    /// Extend the allowed attribute set.
    pub fn attrs(mut self, attrs: &[&'static str]) -> Self {
        self.allowed.extend_from_slice(attrs);
        self
    }

    pub fn fixed_name(mut self, name: &'static str) -> Self {
        self.fixed_name = Some(name);
        self
    }

    pub fn child(mut self, key: &'static str, kind: ChildKind) -> Self {
        self.children.push((key, kind));
        self
    }

    pub fn structural_key(mut self, key: &'static str) -> Self {
        self.structural.push(key);
        self
    }

    pub fn is_allowed(&self, attribute: &str) -> bool {
        self.allowed.contains(&attribute)
    }

    pub fn child_kind(&self, key: &str) -> Option<&ChildKind> {
        self.children
            .iter()
            .find(|(child_key, _)| *child_key == key)
            .map(|(_, kind)| kind)
    }
}

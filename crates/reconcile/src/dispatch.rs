//! Top-level configuration dispatch.
//!
//! A configuration document is a mapping of section keys to subsystem
//! configuration. The dispatcher is assembled once with a static
//! key-to-handler table and then only reads it: dispatching never
//! mutates the registry. Keys nobody registered are skipped so a larger
//! automation document can carry sections this engine does not own;
//! keys that are recognized as subsystem configuration but have no
//! handler are a hard error rather than a silent gap.

use dmr::keys::unescape_keys;
use dmr::{Error, ManagementClient, Result};
use serde_json::Value as Json;

use crate::changes::{ChangeRecord, ChangeTree};

/// A section handler: converges one configuration section and reports
/// its changes.
pub type Handler = fn(&dyn ManagementClient, &Json) -> Result<Vec<ChangeRecord>>;

/// A dispatch failure together with the changes applied before it.
/// Nothing is rolled back; the caller reports both.
#[derive(Debug)]
pub struct DispatchError {
    pub error: Error,
    pub applied: ChangeTree,
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.error.fmt(f)
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Immutable key-to-handler registry.
pub struct Dispatcher {
    handlers: Vec<(&'static str, Handler)>,
    recognized: Vec<&'static str>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            recognized: Vec::new(),
        }
    }

    /// Register a section handler, builder style.
    pub fn register(mut self, key: &'static str, handler: Handler) -> Self {
        self.handlers.push((key, handler));
        self
    }

    /// Mark a key as recognized subsystem configuration without a
    /// handler; dispatching it fails instead of skipping it.
    pub fn recognize(mut self, key: &'static str) -> Self {
        self.recognized.push(key);
        self
    }

    /// Converge every section of `document` in declaration order.
    ///
    /// The document is transcoded to wire form first, so declared keys
    /// may use underscores for hyphens throughout. Changes already
    /// performed are not rolled back when a later section fails; the
    /// error carries the partial tree accumulated up to that point.
    pub fn dispatch(
        &self,
        client: &dyn ManagementClient,
        document: &Json,
    ) -> std::result::Result<ChangeTree, DispatchError> {
        let mut tree = ChangeTree::new();
        match self.dispatch_into(client, document, &mut tree) {
            Ok(()) => Ok(tree),
            Err(error) => Err(DispatchError {
                error,
                applied: tree,
            }),
        }
    }

    fn dispatch_into(
        &self,
        client: &dyn ManagementClient,
        document: &Json,
        tree: &mut ChangeTree,
    ) -> Result<()> {
        let document = unescape_keys(document);
        let sections = document.as_object().ok_or_else(|| {
            Error::Parameter("configuration document must be a mapping".to_string())
        })?;
        for (key, section) in sections {
            if let Some(handler) = self.handler_for(key) {
                log::debug!("dispatching configuration section {key}");
                let records = handler(client, section)?;
                if !records.is_empty() {
                    tree.insert(key.clone(), records);
                }
            } else if self.recognized.contains(&key.as_str()) {
                return Err(Error::Parameter(format!(
                    "configuration section {key} is recognized but not supported"
                )));
            } else {
                log::debug!("ignoring unhandled configuration section {key}");
            }
        }
        Ok(())
    }

    fn handler_for(&self, key: &str) -> Option<Handler> {
        self.handlers
            .iter()
            .find(|(handler_key, _)| *handler_key == key)
            .map(|(_, handler)| *handler)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::Action;
    use crate::testutil::ScriptedClient;
    use serde_json::json;

    fn noop_handler(_: &dyn ManagementClient, _: &Json) -> Result<Vec<ChangeRecord>> {
        Ok(Vec::new())
    }

    fn change_handler(_: &dyn ManagementClient, _: &Json) -> Result<Vec<ChangeRecord>> {
        Ok(vec![ChangeRecord::new("datasource", "TestDS", Action::Add)])
    }

    #[test]
    fn test_unregistered_sections_are_skipped() {
        let dispatcher = Dispatcher::new().register("datasources", noop_handler);
        let client = ScriptedClient::new();
        let tree = dispatcher
            .dispatch(&client, &json!({"datasources": {}, "host_name": "web1"}))
            .unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_recognized_but_unsupported_section_fails() {
        let dispatcher = Dispatcher::new().recognize("security");
        let client = ScriptedClient::new();
        let err = dispatcher
            .dispatch(&client, &json!({"security": {}}))
            .unwrap_err();
        assert!(matches!(err.error, Error::Parameter(_)));
    }

    #[test]
    fn test_failed_dispatch_reports_changes_applied_so_far() {
        fn failing_handler(_: &dyn ManagementClient, _: &Json) -> Result<Vec<ChangeRecord>> {
            Err(Error::Operation("WFLYCTL0158: boom".to_string()))
        }
        let dispatcher = Dispatcher::new()
            .register("datasources", change_handler)
            .register("ee", failing_handler);
        let client = ScriptedClient::new();
        let err = dispatcher
            .dispatch(&client, &json!({"datasources": {}, "ee": {}}))
            .unwrap_err();
        assert!(matches!(err.error, Error::Operation(_)));
        assert_eq!(err.applied["datasources"][0].identifier, "TestDS");
    }

    #[test]
    fn test_sections_without_changes_are_omitted_from_the_tree() {
        let dispatcher = Dispatcher::new()
            .register("datasources", change_handler)
            .register("ee", noop_handler);
        let client = ScriptedClient::new();
        let tree = dispatcher
            .dispatch(&client, &json!({"datasources": {}, "ee": {}}))
            .unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree["datasources"][0].identifier, "TestDS");
    }

    #[test]
    fn test_keys_are_transcoded_before_dispatch() {
        // socket_binding in the document reaches the socket-binding handler.
        let dispatcher = Dispatcher::new().register("socket-binding", change_handler);
        let client = ScriptedClient::new();
        let tree = dispatcher
            .dispatch(&client, &json!({"socket_binding": []}))
            .unwrap();
        assert!(tree.contains_key("socket-binding"));
    }

    #[test]
    fn test_non_mapping_document_is_rejected() {
        let dispatcher = Dispatcher::new();
        let client = ScriptedClient::new();
        let err = dispatcher
            .dispatch(&client, &json!(["not", "a", "mapping"]))
            .unwrap_err();
        assert!(matches!(err.error, Error::Parameter(_)));
    }
}

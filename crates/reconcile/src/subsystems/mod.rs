//! Subsystem modules and the standard dispatcher wiring.

pub mod binding;
pub mod datasources;
pub mod ee;
pub mod extension;
pub mod infinispan;
pub mod jgroups;
pub mod modcluster;

use crate::dispatch::Dispatcher;

/// Configuration sections that belong to this engine but have no
/// handler here; dispatching one is an error rather than a silent skip.
const RECOGNIZED_UNSUPPORTED: &[&str] = &[
    "deployment",
    "interface",
    "keycloak",
    "module",
    "security",
    "undertow",
    "weld",
];

/// The dispatcher with every built-in subsystem handler registered.
pub fn standard_dispatcher() -> Dispatcher {
    let mut dispatcher = Dispatcher::new()
        .register(extension::KEY, extension::apply)
        .register(datasources::KEY, datasources::apply)
        .register(infinispan::KEY, infinispan::apply)
        .register(jgroups::KEY, jgroups::apply)
        .register(modcluster::KEY, modcluster::apply)
        .register(binding::KEY, binding::apply)
        .register(ee::KEY, ee::apply);
    for key in RECOGNIZED_UNSUPPORTED {
        dispatcher = dispatcher.recognize(key);
    }
    dispatcher
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::Action;
    use crate::testutil::ScriptedClient;
    use dmr::{CmdResult, Error};
    use serde_json::json;

    #[test]
    fn test_document_with_underscored_keys_converges_end_to_end() {
        // Ansible-style document: underscores everywhere, foreign keys
        // (host_name) mixed in.
        let document = json!({
            "host_name": "web1",
            "datasources": {
                "data_source": [{
                    "name": "TestDS",
                    "connection_url": "jdbc:h2:mem:test",
                    "driver_name": "h2"
                }]
            },
            "ee": {
                "service": {"name": "default-bindings", "datasource": "java:jboss/datasources/TestDS"}
            }
        });
        let client = ScriptedClient::new()
            .expect(
                "/subsystem=datasources/data-source=TestDS:read-resource(recursive=true)",
                CmdResult::failed("WFLYCTL0216: not found"),
            )
            .expect(
                "/subsystem=datasources/data-source=TestDS:add(connection-url=\"jdbc:h2:mem:test\", driver-name=\"h2\")",
                CmdResult::ok_empty(),
            )
            .expect(
                "/subsystem=ee/service=default-bindings:read-resource(recursive=true)",
                CmdResult::ok(json!({"datasource": "java:jboss/datasources/TestDS"})),
            );
        let tree = standard_dispatcher().dispatch(&client, &document).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree["datasources"][0].identifier, "TestDS");
        assert_eq!(tree["datasources"][0].action, Action::Add);
        client.assert_done();
    }

    #[test]
    fn test_recognized_unsupported_section_is_a_hard_error() {
        let client = ScriptedClient::new();
        let err = standard_dispatcher()
            .dispatch(&client, &json!({"security": {"security-domain": []}}))
            .unwrap_err();
        assert!(matches!(err.error, Error::Parameter(_)));
    }
}

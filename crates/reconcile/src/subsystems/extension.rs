//! Server extensions.
//!
//! Extensions live at the top-level `/extension=<name>` address. The
//! `module` attribute is create-only, so a declared module differing
//! from a registered extension's module is a configuration error, not
//! a write.

use dmr::{Error, ManagementClient, PathTemplate, Result, encode_params};
use serde_json::{Value as Json, json};

use crate::changes::{Action, ChangeRecord};
use crate::spec::{DesiredState, ResourceSpec};

pub const KEY: &str = "extension";

fn extension_template() -> PathTemplate {
    PathTemplate::new().wildcard("extension")
}

/// Converge the `extension` section.
pub fn apply(client: &dyn ManagementClient, section: &Json) -> Result<Vec<ChangeRecord>> {
    let mut records = Vec::new();
    for spec in ResourceSpec::list_from(section)? {
        let name = spec.require_str("name")?.to_string();
        let path = extension_template().bind(&[&name])?;
        match spec.state()? {
            DesiredState::Absent => match client.remove(&path) {
                Ok(_) => records.push(ChangeRecord::new("extension", &name, Action::Delete)),
                Err(Error::NotFound(_)) => {}
                Err(err) => return Err(err),
            },
            DesiredState::Present => {
                let module = spec.require_str("module")?.to_string();
                match client.read_resource(&path, false) {
                    Ok(live) => {
                        let registered = live.get("module").and_then(|node| node.as_str());
                        if registered != Some(module.as_str()) {
                            return Err(Error::Parameter(format!(
                                "extension {name} is registered with a different module and the module attribute is not writable"
                            )));
                        }
                    }
                    Err(Error::NotFound(_)) => {
                        let module_value = json!(module);
                        let params = encode_params([("module", &module_value)]);
                        client.add(&path, &params)?;
                        records.push(
                            ChangeRecord::new("extension", &name, Action::Add).with_params(params),
                        );
                    }
                    Err(err) => return Err(err),
                }
            }
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::ScriptedClient;
    use dmr::CmdResult;

    #[test]
    fn test_missing_extension_is_added_with_its_module() {
        let client = ScriptedClient::new()
            .expect(
                "/extension=org.keycloak.keycloak-adapter-subsystem:read-resource(recursive=false)",
                CmdResult::failed("WFLYCTL0216: not found"),
            )
            .expect(
                "/extension=org.keycloak.keycloak-adapter-subsystem:add(module=\"org.keycloak.keycloak-adapter-subsystem\")",
                CmdResult::ok_empty(),
            );
        let section = json!([{
            "name": "org.keycloak.keycloak-adapter-subsystem",
            "module": "org.keycloak.keycloak-adapter-subsystem"
        }]);
        let records = apply(&client, &section).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, "extension");
        assert_eq!(records[0].action, Action::Add);
        client.assert_done();
    }

    #[test]
    fn test_registered_extension_with_matching_module_is_converged() {
        let client = ScriptedClient::new().expect(
            "/extension=org.wildfly.extension.undertow:read-resource(recursive=false)",
            CmdResult::ok(json!({"module": "org.wildfly.extension.undertow"})),
        );
        let section = json!({
            "name": "org.wildfly.extension.undertow",
            "module": "org.wildfly.extension.undertow"
        });
        assert!(apply(&client, &section).unwrap().is_empty());
        client.assert_done();
    }

    #[test]
    fn test_differing_module_is_a_parameter_error() {
        let client = ScriptedClient::new().expect(
            "/extension=org.wildfly.extension.undertow:read-resource(recursive=false)",
            CmdResult::ok(json!({"module": "org.wildfly.extension.undertow"})),
        );
        let section = json!({
            "name": "org.wildfly.extension.undertow",
            "module": "org.example.other"
        });
        let err = apply(&client, &section).unwrap_err();
        assert!(matches!(err, Error::Parameter(_)));
        client.assert_done();
    }

    #[test]
    fn test_absent_extension_removal_is_idempotent() {
        let client = ScriptedClient::new().expect(
            "/extension=org.example.legacy:remove()",
            CmdResult::failed("WFLYCTL0216: not found"),
        );
        let section = json!({"name": "org.example.legacy", "state": "absent"});
        assert!(apply(&client, &section).unwrap().is_empty());
        client.assert_done();
    }
}

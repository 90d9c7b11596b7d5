//! Modcluster subsystem.
//!
//! Presence only: the subsystem is added or removed whole and carries
//! no synchronized attributes.

use dmr::{Error, ManagementClient, ResourcePath, Result};
use serde_json::Value as Json;

use crate::changes::{Action, ChangeRecord};
use crate::spec::{DesiredState, ResourceSpec};

pub const KEY: &str = "modcluster";

fn subsystem_path() -> ResourcePath {
    ResourcePath::new().child("subsystem", "modcluster")
}

/// Converge the `modcluster` section.
pub fn apply(client: &dyn ManagementClient, section: &Json) -> Result<Vec<ChangeRecord>> {
    let spec = ResourceSpec::from_value(section)?;
    let path = subsystem_path();
    match spec.state()? {
        DesiredState::Absent => match client.remove(&path) {
            Ok(_) => Ok(vec![ChangeRecord::new(
                "subsystem",
                "modcluster",
                Action::Delete,
            )]),
            Err(Error::NotFound(_)) => Ok(Vec::new()),
            Err(err) => Err(err),
        },
        DesiredState::Present => match client.read_resource(&path, false) {
            Ok(_) => Ok(Vec::new()),
            Err(Error::NotFound(_)) => {
                client.add(&path, "")?;
                Ok(vec![ChangeRecord::new(
                    "subsystem",
                    "modcluster",
                    Action::Add,
                )])
            }
            Err(err) => Err(err),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::ScriptedClient;
    use dmr::CmdResult;
    use serde_json::json;

    #[test]
    fn test_missing_subsystem_is_added() {
        let client = ScriptedClient::new()
            .expect(
                "/subsystem=modcluster:read-resource(recursive=false)",
                CmdResult::failed("WFLYCTL0216: not found"),
            )
            .expect("/subsystem=modcluster:add()", CmdResult::ok_empty());
        let records = apply(&client, &json!({"state": "present"})).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, Action::Add);
        client.assert_done();
    }

    #[test]
    fn test_present_subsystem_is_converged() {
        let client = ScriptedClient::new().expect(
            "/subsystem=modcluster:read-resource(recursive=false)",
            CmdResult::ok(json!({})),
        );
        assert!(apply(&client, &json!({})).unwrap().is_empty());
        client.assert_done();
    }

    #[test]
    fn test_absent_subsystem_is_removed() {
        let client = ScriptedClient::new()
            .expect("/subsystem=modcluster:remove()", CmdResult::ok_empty());
        let records = apply(&client, &json!({"state": "absent"})).unwrap();
        assert_eq!(records[0].action, Action::Delete);
        client.assert_done();
    }
}

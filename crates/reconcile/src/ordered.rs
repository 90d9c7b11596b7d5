//! Ordered child collection synchronization.
//!
//! Protocol stacks are order-sensitive: the server applies children in
//! registration order, so a declaration is only converged when the live
//! child list matches it name-for-name, in order. When it does, each
//! child's properties are synchronized in place. Any order or membership
//! mismatch (an empty live list included) discards the whole live list
//! and recreates it in declared order.

use dmr::{ManagementClient, ResourcePath, Result, encode_params, encode_value};
use serde_json::Value as Json;

use crate::changes::{Action, AttributeChange, ChangeRecord};
use crate::coerce;

/// One declared member of an ordered child collection.
#[derive(Debug, Clone)]
pub struct OrderedChildSpec {
    /// Child name, also its address segment.
    pub name: String,
    /// Creation parameters used when the child has to be (re)created.
    pub add_params: Vec<(String, Json)>,
    /// Child properties; a `None` value deletes the property.
    pub properties: Vec<(String, Option<Json>)>,
}

impl OrderedChildSpec {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            add_params: Vec::new(),
            properties: Vec::new(),
        }
    }
}

/// Converge the ordered children of `parent` under the `child_key`
/// address segment.
pub fn sync_ordered_children(
    client: &dyn ManagementClient,
    parent: &ResourcePath,
    child_key: &str,
    declared: &[OrderedChildSpec],
) -> Result<Vec<ChangeRecord>> {
    let live = client.read_children_names(parent, child_key)?;
    let aligned = !live.is_empty()
        && live.len() == declared.len()
        && live
            .iter()
            .zip(declared.iter())
            .all(|(live_name, child)| *live_name == child.name);

    let mut records = Vec::new();
    if aligned {
        for child in declared {
            let path = parent.clone().child(child_key, &child.name);
            let changes = sync_properties(client, &path, &child.properties)?;
            if !changes.is_empty() {
                records.push(
                    ChangeRecord::new(child_key, &child.name, Action::Update)
                        .with_changes(changes),
                );
            }
        }
        return Ok(records);
    }

    log::debug!(
        "{parent} children ({child_key}) out of order, rebuilding: live={live:?}, declared={:?}",
        declared.iter().map(|c| c.name.as_str()).collect::<Vec<_>>()
    );
    for name in &live {
        client.remove(&parent.clone().child(child_key, name))?;
        records.push(ChangeRecord::new(child_key, name, Action::Delete));
    }
    for child in declared {
        let path = parent.clone().child(child_key, &child.name);
        let params = encode_params(child.add_params.iter().map(|(k, v)| (k.as_str(), v)));
        client.add(&path, &params)?;
        let mut changes = Vec::new();
        for (prop, value) in &child.properties {
            if let Some(value) = value {
                add_property(client, &path, prop, value)?;
                changes.push(AttributeChange::added(prop, value.clone()));
            }
        }
        let mut record = ChangeRecord::new(child_key, &child.name, Action::Add);
        if !params.is_empty() {
            record = record.with_params(params);
        }
        records.push(record.with_changes(changes));
    }
    Ok(records)
}

fn sync_properties(
    client: &dyn ManagementClient,
    path: &ResourcePath,
    properties: &[(String, Option<Json>)],
) -> Result<Vec<AttributeChange>> {
    if properties.is_empty() {
        return Ok(Vec::new());
    }
    let live = client.read_resource(path, true)?;
    let mut changes = Vec::new();
    for (prop, declared) in properties {
        let slot = live
            .get("properties")
            .and_then(|node| node.get(prop))
            .filter(|node| !node.is_undefined());
        match (slot, declared) {
            (None, None) => {}
            (Some(slot), None) => {
                remove_property(client, path, prop)?;
                changes.push(AttributeChange::deleted(prop, coerce::from_live(slot).to_json()));
            }
            (None, Some(value)) => {
                add_property(client, path, prop, value)?;
                changes.push(AttributeChange::added(prop, value.clone()));
            }
            (Some(slot), Some(value)) => {
                let old = coerce::from_live(slot);
                // Property values are untyped strings server-side.
                if old.stringified() == coerce::from_declared(value).stringified() {
                    continue;
                }
                // The bridge's property add overwrites an existing value.
                add_property(client, path, prop, value)?;
                changes.push(AttributeChange::updated(prop, old.to_json(), value.clone()));
            }
        }
    }
    Ok(changes)
}

fn add_property(
    client: &dyn ManagementClient,
    path: &ResourcePath,
    prop: &str,
    value: &Json,
) -> Result<()> {
    let prop_path = path.clone().child("property", prop);
    client.add(&prop_path, &format!("value={}", encode_value(value)))?;
    Ok(())
}

fn remove_property(client: &dyn ManagementClient, path: &ResourcePath, prop: &str) -> Result<()> {
    client.remove(&path.clone().child("property", prop))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::ScriptedClient;
    use dmr::CmdResult;
    use serde_json::json;

    fn stack_path() -> ResourcePath {
        ResourcePath::new()
            .child("subsystem", "jgroups")
            .child("stack", "udp")
    }

    fn protocol(name: &str) -> OrderedChildSpec {
        OrderedChildSpec::new(name)
    }

    #[test]
    fn test_matching_order_syncs_properties_in_place() {
        let mut udp = protocol("UDP");
        udp.properties
            .push(("ip_ttl".to_string(), Some(json!(2))));
        let client = ScriptedClient::new()
            .expect(
                "/subsystem=jgroups/stack=udp:read-children-names(child-type=protocol)",
                CmdResult::ok(json!(["UDP", "PING"])),
            )
            .expect(
                "/subsystem=jgroups/stack=udp/protocol=UDP:read-resource(recursive=true)",
                CmdResult::ok(json!({"properties": {"ip_ttl": "8"}})),
            )
            .expect(
                "/subsystem=jgroups/stack=udp/protocol=UDP/property=ip_ttl:add(value=2)",
                CmdResult::ok_empty(),
            );
        let records =
            sync_ordered_children(&client, &stack_path(), "protocol", &[udp, protocol("PING")])
                .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, Action::Update);
        assert_eq!(records[0].changes[0].attribute, "ip_ttl");
        client.assert_done();
    }

    #[test]
    fn test_swapped_order_triggers_full_rebuild() {
        // Same membership, two entries swapped: everything is recreated.
        let client = ScriptedClient::new()
            .expect(
                "/subsystem=jgroups/stack=udp:read-children-names(child-type=protocol)",
                CmdResult::ok(json!(["PING", "UDP"])),
            )
            .expect("/subsystem=jgroups/stack=udp/protocol=PING:remove()", CmdResult::ok_empty())
            .expect("/subsystem=jgroups/stack=udp/protocol=UDP:remove()", CmdResult::ok_empty())
            .expect("/subsystem=jgroups/stack=udp/protocol=UDP:add()", CmdResult::ok_empty())
            .expect("/subsystem=jgroups/stack=udp/protocol=PING:add()", CmdResult::ok_empty());
        let records =
            sync_ordered_children(&client, &stack_path(), "protocol", &[protocol("UDP"), protocol("PING")])
                .unwrap();
        let actions: Vec<Action> = records.iter().map(|r| r.action).collect();
        assert_eq!(
            actions,
            vec![Action::Delete, Action::Delete, Action::Add, Action::Add]
        );
        client.assert_done();
    }

    #[test]
    fn test_empty_live_list_takes_the_rebuild_path() {
        let mut udp = protocol("UDP");
        udp.add_params
            .push(("socket-binding".to_string(), json!("jgroups-udp")));
        let client = ScriptedClient::new()
            .expect(
                "/subsystem=jgroups/stack=udp:read-children-names(child-type=protocol)",
                CmdResult::ok(json!([])),
            )
            .expect(
                "/subsystem=jgroups/stack=udp/protocol=UDP:add(socket-binding=\"jgroups-udp\")",
                CmdResult::ok_empty(),
            );
        let records = sync_ordered_children(&client, &stack_path(), "protocol", &[udp]).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, Action::Add);
        assert_eq!(records[0].params.as_deref(), Some("socket-binding=\"jgroups-udp\""));
        client.assert_done();
    }

    #[test]
    fn test_converged_stack_reports_nothing() {
        let client = ScriptedClient::new().expect(
            "/subsystem=jgroups/stack=udp:read-children-names(child-type=protocol)",
            CmdResult::ok(json!(["UDP", "PING"])),
        );
        let records = sync_ordered_children(
            &client,
            &stack_path(),
            "protocol",
            &[protocol("UDP"), protocol("PING")],
        )
        .unwrap();
        assert!(records.is_empty());
        client.assert_done();
    }
}

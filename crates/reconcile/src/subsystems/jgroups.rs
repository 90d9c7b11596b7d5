//! JGroups subsystem.
//!
//! The subsystem node itself (default channel and stack), named
//! channels, and protocol stacks. A stack's protocol list is
//! order-sensitive and goes through the ordered child synchronizer.

use dmr::{Error, ManagementClient, PathTemplate, ResourcePath, Result, encode_params};
use serde_json::{Map, Value as Json};

use crate::attr::sync_attributes;
use crate::changes::{Action, ChangeRecord};
use crate::lifecycle::ensure;
use crate::ordered::{OrderedChildSpec, sync_ordered_children};
use crate::profile::{ChildKind, ResourceProfile};
use crate::spec::{DesiredState, ResourceSpec};

pub const KEY: &str = "jgroups";

const SUBSYSTEM_ATTRS: &[&str] = &["default-channel", "default-stack"];

const TRANSPORT_ATTRS: &[&str] = &["shared", "socket-binding", "site", "rack", "machine"];

const CHANNEL_ATTRS: &[&str] = &["stack", "module", "cluster"];

fn subsystem_path() -> ResourcePath {
    ResourcePath::new().child("subsystem", "jgroups")
}

fn stack_profile() -> ResourceProfile {
    ResourceProfile::new(
        "stack",
        PathTemplate::new()
            .fixed("subsystem", "jgroups")
            .wildcard("stack"),
    )
    .child("transport", ChildKind::Custom(sync_transport))
    .child("protocol", ChildKind::Custom(sync_protocols))
}

fn channel_profile() -> ResourceProfile {
    ResourceProfile::new(
        "channel",
        PathTemplate::new()
            .fixed("subsystem", "jgroups")
            .wildcard("channel"),
    )
    .attrs(CHANNEL_ATTRS)
}

/// Child handler for a stack's transport.
///
/// The transport is addressed by its declared `type`; any other
/// transport registered on the stack is removed first, so changing the
/// type replaces the resource instead of writing a create-only
/// attribute.
fn sync_transport(
    client: &dyn ManagementClient,
    lineage: &[&str],
    section: &Json,
) -> Result<Vec<ChangeRecord>> {
    let stack = lineage
        .last()
        .ok_or_else(|| Error::Parameter("transport declared outside a stack".to_string()))?;
    let spec = ResourceSpec::from_value(section)?;
    let name = spec.require_str("type")?.to_string();
    for (key, _) in spec.iter() {
        if key == "type" || TRANSPORT_ATTRS.contains(&key) {
            continue;
        }
        return Err(Error::Parameter(format!(
            "transport configuration does not support the key {key}"
        )));
    }

    let parent = subsystem_path().child("stack", stack);
    let mut records = Vec::new();
    for stale in client.read_children_names(&parent, "transport")? {
        if stale == "TRANSPORT" || stale == name {
            continue;
        }
        match client.remove(&parent.clone().child("transport", &stale)) {
            Ok(_) => records.push(ChangeRecord::new("transport", &stale, Action::Delete)),
            Err(Error::NotFound(_)) => {}
            Err(err) => return Err(err),
        }
    }

    let path = parent.child("transport", &name);
    match client.read_resource(&path, true) {
        Ok(live) => {
            let declared: Map<String, Json> = spec
                .iter()
                .filter(|(key, _)| TRANSPORT_ATTRS.contains(key))
                .map(|(key, value)| (key.to_string(), value.clone()))
                .collect();
            let changes = sync_attributes(client, &path, &live, &declared, TRANSPORT_ATTRS)?;
            if !changes.is_empty() {
                records.push(
                    ChangeRecord::new("transport", &name, Action::Update).with_changes(changes),
                );
            }
        }
        Err(Error::NotFound(_)) => {
            let params = encode_params(spec.iter().filter(|(key, value)| {
                (*key == "type" || TRANSPORT_ATTRS.contains(key)) && !value.is_null()
            }));
            client.add(&path, &params)?;
            records.push(ChangeRecord::new("transport", &name, Action::Add).with_params(params));
        }
        Err(err) => return Err(err),
    }
    Ok(records)
}

/// Child handler for a stack's ordered `protocol` list.
fn sync_protocols(
    client: &dyn ManagementClient,
    lineage: &[&str],
    section: &Json,
) -> Result<Vec<ChangeRecord>> {
    let stack = lineage
        .last()
        .ok_or_else(|| Error::Parameter("protocol list declared outside a stack".to_string()))?;
    let parent = subsystem_path().child("stack", stack);
    let mut declared = Vec::new();
    for spec in ResourceSpec::list_from(section)? {
        let name = spec.require_str("type")?;
        let mut child = OrderedChildSpec::new(name);
        for (key, value) in spec.iter() {
            match key {
                "type" => {}
                "socket-binding" | "module" => {
                    if !value.is_null() {
                        child.add_params.push((key.to_string(), value.clone()));
                    }
                }
                "properties" => {
                    let props = value.as_object().ok_or_else(|| {
                        Error::Parameter(format!(
                            "protocol {name} properties must be a mapping"
                        ))
                    })?;
                    for (prop, prop_value) in props {
                        let declared_value =
                            (!prop_value.is_null()).then(|| prop_value.clone());
                        child.properties.push((prop.clone(), declared_value));
                    }
                }
                other => {
                    return Err(Error::Parameter(format!(
                        "protocol configuration does not support the key {other}"
                    )));
                }
            }
        }
        declared.push(child);
    }
    sync_ordered_children(client, &parent, "protocol", &declared)
}

/// Converge the `jgroups` section.
pub fn apply(client: &dyn ManagementClient, section: &Json) -> Result<Vec<ChangeRecord>> {
    let spec = ResourceSpec::from_value(section)?;
    let path = subsystem_path();
    let mut records = Vec::new();

    if spec.state()? == DesiredState::Absent {
        return match client.remove(&path) {
            Ok(_) => Ok(vec![ChangeRecord::new("subsystem", "jgroups", Action::Delete)]),
            Err(Error::NotFound(_)) => Ok(Vec::new()),
            Err(err) => Err(err),
        };
    }

    for (key, _) in spec.iter() {
        if key == "state" || key == "stack" || key == "channel" || SUBSYSTEM_ATTRS.contains(&key) {
            continue;
        }
        return Err(Error::Parameter(format!(
            "jgroups configuration does not support the key {key}"
        )));
    }

    let declared: Map<String, Json> = spec
        .iter()
        .filter(|(key, _)| SUBSYSTEM_ATTRS.contains(key))
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect();
    match client.read_resource(&path, true) {
        Ok(live) => {
            let changes = sync_attributes(client, &path, &live, &declared, SUBSYSTEM_ATTRS)?;
            if !changes.is_empty() {
                records.push(
                    ChangeRecord::new("subsystem", "jgroups", Action::Update).with_changes(changes),
                );
            }
        }
        Err(Error::NotFound(_)) => {
            let params = encode_params(
                declared
                    .iter()
                    .filter(|(_, value)| !value.is_null())
                    .map(|(key, value)| (key.as_str(), value)),
            );
            client.add(&path, &params)?;
            let mut record = ChangeRecord::new("subsystem", "jgroups", Action::Add);
            if !params.is_empty() {
                record = record.with_params(params);
            }
            records.push(record);
        }
        Err(err) => return Err(err),
    }

    if let Some(stacks) = spec.get("stack") {
        for stack_spec in ResourceSpec::list_from(stacks)? {
            records.extend(ensure(client, &stack_profile(), &[], &stack_spec)?);
        }
    }
    if let Some(channels) = spec.get("channel") {
        for channel_spec in ResourceSpec::list_from(channels)? {
            records.extend(ensure(client, &channel_profile(), &[], &channel_spec)?);
        }
    }
    Ok(records)
}

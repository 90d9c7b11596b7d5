//! Resource lifecycle convergence.
//!
//! [`ensure`] drives one declared resource to its goal state: probe the
//! live resource, add it when missing, synchronize its attributes when
//! found, remove it when declared absent, then recurse into declared
//! child sections. Absence of a resource that should be absent is
//! success, not an error.

use dmr::{Error, ManagementClient, Result, encode_params};
use serde_json::{Map, Value as Json};

use crate::attr::sync_attributes;
use crate::changes::{Action, ChangeRecord};
use crate::profile::{ChildKind, ResourceProfile};
use crate::spec::{DesiredState, ResourceSpec};

/// Declared keys that are structure, not attributes, on every resource.
const COMMON_STRUCTURAL: [&str; 2] = ["name", "state"];

/// Converge one declared resource (and its declared children) to its
/// goal state, returning the changes performed in order.
pub fn ensure(
    client: &dyn ManagementClient,
    profile: &ResourceProfile,
    ancestors: &[&str],
    spec: &ResourceSpec,
) -> Result<Vec<ChangeRecord>> {
    let name = match profile.fixed_name {
        Some(fixed) => fixed.to_string(),
        None => spec.require_str("name")?.to_string(),
    };
    let mut bound: Vec<&str> = ancestors.to_vec();
    if profile.fixed_name.is_none() {
        bound.push(&name);
    }
    let path = profile.template.bind(&bound)?;

    validate_keys(profile, spec)?;

    let mut records = Vec::new();
    match spec.state()? {
        DesiredState::Absent => match client.remove(&path) {
            Ok(_) => {
                records.push(ChangeRecord::new(profile.kind, &name, Action::Delete));
            }
            // Already gone is the goal state.
            Err(Error::NotFound(_)) => {}
            Err(err) => return Err(err),
        },
        DesiredState::Present => {
            match client.read_resource(&path, true) {
                Ok(live) => {
                    let declared = attribute_subset(profile, spec);
                    let changes =
                        sync_attributes(client, &path, &live, &declared, &profile.allowed)?;
                    if !changes.is_empty() {
                        records.push(
                            ChangeRecord::new(profile.kind, &name, Action::Update)
                                .with_changes(changes),
                        );
                    }
                }
                Err(Error::NotFound(_)) => {
                    let params = add_params(profile, spec);
                    client.add(&path, &params)?;
                    let mut record = ChangeRecord::new(profile.kind, &name, Action::Add);
                    if !params.is_empty() {
                        record = record.with_params(params);
                    }
                    records.push(record);
                }
                Err(err) => return Err(err),
            }
            for (key, kind) in &profile.children {
                if let Some(section) = spec.get(key) {
                    records.extend(ensure_child(client, kind, &bound, section)?);
                }
            }
        }
    }
    Ok(records)
}

/// Converge a singleton child configuration: a mapping means present,
/// an explicit null means absent.
pub fn ensure_component(
    client: &dyn ManagementClient,
    profile: &ResourceProfile,
    ancestors: &[&str],
    config: &Json,
) -> Result<Vec<ChangeRecord>> {
    if config.is_null() {
        let path = profile.template.bind(ancestors)?;
        let name = profile
            .fixed_name
            .map_or_else(|| path.leaf_name().unwrap_or_default().to_string(), str::to_string);
        return match client.remove(&path) {
            Ok(_) => Ok(vec![ChangeRecord::new(profile.kind, &name, Action::Delete)]),
            Err(Error::NotFound(_)) => Ok(Vec::new()),
            Err(err) => Err(err),
        };
    }
    ensure(client, profile, ancestors, &ResourceSpec::from_value(config)?)
}

fn ensure_child(
    client: &dyn ManagementClient,
    kind: &ChildKind,
    lineage: &[&str],
    section: &Json,
) -> Result<Vec<ChangeRecord>> {
    match kind {
        ChildKind::Collection(profile) => {
            let mut records = Vec::new();
            for child_spec in ResourceSpec::list_from(section)? {
                records.extend(ensure(client, profile, lineage, &child_spec)?);
            }
            Ok(records)
        }
        ChildKind::Component(profile) => ensure_component(client, profile, lineage, section),
        ChildKind::Custom(handler) => handler(client, lineage, section),
    }
}

/// Reject declared keys that are neither attributes, structure, nor
/// recognized children.
fn validate_keys(profile: &ResourceProfile, spec: &ResourceSpec) -> Result<()> {
    for (key, _) in spec.iter() {
        if COMMON_STRUCTURAL.contains(&key)
            || profile.is_allowed(key)
            || profile.structural.contains(&key)
            || profile.child_kind(key).is_some()
        {
            continue;
        }
        return Err(Error::Parameter(format!(
            "{} configuration does not support the key {key}",
            profile.kind
        )));
    }
    Ok(())
}

/// The declared members that are attributes, in declaration order.
fn attribute_subset(profile: &ResourceProfile, spec: &ResourceSpec) -> Map<String, Json> {
    spec.iter()
        .filter(|(key, _)| profile.is_allowed(key))
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}

/// Creation parameters: declared attributes with a value, rendered as
/// the `add` argument fragment.
fn add_params(profile: &ResourceProfile, spec: &ResourceSpec) -> String {
    encode_params(
        spec.iter()
            .filter(|(key, value)| profile.is_allowed(key) && !value.is_null()),
    )
}

//! Attribute-level synchronization against a live resource.
//!
//! For each declared attribute the live slot decides the coercion, then
//! the pair lands in one of three lanes: scalar write/undefine, list
//! replace, or whole-object rewrite. Attributes absent from the declared
//! mapping are never touched.

use dmr::{Command, Error, ManagementClient, ModelValue, ResourcePath, Result, encode_value};
use serde_json::{Map, Value as Json};

use crate::changes::AttributeChange;
use crate::coerce::{self, Comparable};

/// Synchronize declared attributes into the resource at `path`.
///
/// `live` is the resource's current model node. Every declared key must
/// be in `allowed` and must name a slot the model actually has; either
/// violation is a parameter error before anything is written.
pub fn sync_attributes(
    client: &dyn ManagementClient,
    path: &ResourcePath,
    live: &ModelValue,
    declared: &Map<String, Json>,
    allowed: &[&str],
) -> Result<Vec<AttributeChange>> {
    let mut changes = Vec::new();
    for (name, value) in declared {
        if !allowed.contains(&name.as_str()) {
            return Err(Error::Parameter(format!(
                "attribute {name} is not allowed on {path}"
            )));
        }
        let slot = live.get(name).ok_or_else(|| {
            Error::Parameter(format!("attribute {name} is not present in the model of {path}"))
        })?;
        let (old, new) = coerce::coerce(name, slot, Some(value))?;
        if let Some(change) = converge_attribute(client, path, name, &old, &new)? {
            changes.push(change);
        }
    }
    Ok(changes)
}

fn converge_attribute(
    client: &dyn ManagementClient,
    path: &ResourcePath,
    name: &str,
    old: &Comparable,
    new: &Comparable,
) -> Result<Option<AttributeChange>> {
    // Deletion first: a declared null undefines whatever is there.
    if new.is_none() {
        if old.is_none() {
            return Ok(None);
        }
        let command = Command::new(path, "undefine-attribute")
            .raw_args(&format!("name={name}"))
            .render();
        client.run(&command)?;
        return Ok(Some(AttributeChange::deleted(name, old.to_json())));
    }

    match (old, new) {
        (Comparable::List(old_items), Comparable::List(new_items)) => {
            if coerce::multiset_eq(old_items, new_items) {
                log::debug!("attribute {name} on {path} already converged (list)");
                return Ok(None);
            }
            replace_list(client, path, name, new_items)?;
            Ok(Some(AttributeChange::updated(name, old.to_json(), new.to_json())))
        }
        (Comparable::None, Comparable::List(new_items)) => {
            replace_list(client, path, name, new_items)?;
            Ok(Some(AttributeChange::added(name, new.to_json())))
        }
        (Comparable::Map(_), Comparable::Map(_)) => {
            // Nested values may differ in numeric vs string form between
            // the model and the declaration; compare their string image.
            if old.stringified() == new.stringified() {
                log::debug!("attribute {name} on {path} already converged (object)");
                return Ok(None);
            }
            write_attribute(client, path, name, &new.to_json())?;
            Ok(Some(AttributeChange::updated(name, old.to_json(), new.to_json())))
        }
        _ => {
            if old == new {
                log::debug!("attribute {name} on {path} already converged");
                return Ok(None);
            }
            write_attribute(client, path, name, &new.to_json())?;
            if old.is_none() {
                Ok(Some(AttributeChange::added(name, new.to_json())))
            } else {
                Ok(Some(AttributeChange::updated(name, old.to_json(), new.to_json())))
            }
        }
    }
}

fn write_attribute(
    client: &dyn ManagementClient,
    path: &ResourcePath,
    name: &str,
    value: &Json,
) -> Result<()> {
    let command = Command::new(path, "write-attribute")
        .raw_args(&format!("name={name}"))
        .arg("value", value)
        .render();
    client.run(&command)?;
    Ok(())
}

/// Clear the list attribute, then append the declared elements in
/// declaration order.
fn replace_list(
    client: &dyn ManagementClient,
    path: &ResourcePath,
    name: &str,
    elements: &[Comparable],
) -> Result<()> {
    let clear = Command::new(path, "list-clear")
        .raw_args(&format!("name={name}"))
        .render();
    client.run(&clear)?;
    for element in elements {
        let add = Command::new(path, "list-add")
            .raw_args(&format!("name={name}"))
            .raw_args(&format!("value={}", encode_value(&element.to_json())))
            .render();
        client.run(&add)?;
    }
    Ok(())
}

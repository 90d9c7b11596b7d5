//! EE subsystem default bindings.
//!
//! Only updates existing `service` resources under `/subsystem=ee`; a
//! missing service is a configuration mistake (those services are part
//! of the server profile), so it is reported as a parameter error
//! instead of being created.

use dmr::{Error, ManagementClient, PathTemplate, Result};
use serde_json::{Map, Value as Json};

use crate::attr::sync_attributes;
use crate::changes::{Action, ChangeRecord};
use crate::spec::ResourceSpec;

pub const KEY: &str = "ee";

const SERVICE_ATTRS: &[&str] = &["datasource"];

fn service_template() -> PathTemplate {
    PathTemplate::new()
        .fixed("subsystem", "ee")
        .wildcard("service")
}

/// Converge the `ee` section.
pub fn apply(client: &dyn ManagementClient, section: &Json) -> Result<Vec<ChangeRecord>> {
    let sections = section
        .as_object()
        .ok_or_else(|| Error::Parameter("ee configuration must be a mapping".to_string()))?;
    let mut records = Vec::new();
    for (key, value) in sections {
        match key.as_str() {
            "service" => {
                for spec in ResourceSpec::list_from(value)? {
                    records.extend(sync_service(client, &spec)?);
                }
            }
            other => {
                return Err(Error::Parameter(format!(
                    "ee configuration does not support the key {other}"
                )));
            }
        }
    }
    Ok(records)
}

fn sync_service(client: &dyn ManagementClient, spec: &ResourceSpec) -> Result<Vec<ChangeRecord>> {
    let name = spec.require_str("name")?.to_string();
    let path = service_template().bind(&[&name])?;
    let live = match client.read_resource(&path, true) {
        Ok(live) => live,
        Err(Error::NotFound(_)) => {
            return Err(Error::Parameter(format!(
                "failed to update default bindings: service {name} does not exist"
            )));
        }
        Err(err) => return Err(err),
    };
    let declared: Map<String, Json> = spec
        .iter()
        .filter(|(key, _)| *key != "name" && *key != "state")
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect();
    let changes = sync_attributes(client, &path, &live, &declared, SERVICE_ATTRS)?;
    if changes.is_empty() {
        Ok(Vec::new())
    } else {
        Ok(vec![
            ChangeRecord::new("service", &name, Action::Update).with_changes(changes),
        ])
    }
}

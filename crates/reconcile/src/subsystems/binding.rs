//! Socket bindings.
//!
//! Bindings live under a named socket binding group, so each declared
//! binding carries a `socket-binding-group-name` alongside its own name.

use dmr::{ManagementClient, PathTemplate, Result};
use serde_json::Value as Json;

use crate::changes::ChangeRecord;
use crate::lifecycle::ensure;
use crate::profile::ResourceProfile;
use crate::spec::ResourceSpec;

pub const KEY: &str = "socket-binding";

const GROUP_KEY: &str = "socket-binding-group-name";

const BINDING_ATTRS: &[&str] = &["port", "interface"];

fn binding_profile() -> ResourceProfile {
    ResourceProfile::new(
        "socket-binding",
        PathTemplate::new()
            .wildcard("socket-binding-group")
            .wildcard("socket-binding"),
    )
    .attrs(BINDING_ATTRS)
}

/// Converge the `socket-binding` section.
pub fn apply(client: &dyn ManagementClient, section: &Json) -> Result<Vec<ChangeRecord>> {
    let profile = binding_profile();
    let mut records = Vec::new();
    for spec in ResourceSpec::list_from(section)? {
        let group = spec.require_str(GROUP_KEY)?.to_string();
        records.extend(ensure(
            client,
            &profile,
            &[&group],
            &spec.without(&[GROUP_KEY]),
        )?);
    }
    Ok(records)
}

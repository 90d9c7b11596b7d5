//! Infinispan subsystem.
//!
//! Cache containers with their transport, caches of the four families,
//! and per-cache configuration components. Cache family profiles are
//! built by extending a shared base attribute set; the declared `type`
//! member selects the family.

use dmr::{Error, ManagementClient, PathTemplate, Result};
use serde_json::Value as Json;

use crate::changes::ChangeRecord;
use crate::lifecycle::ensure;
use crate::profile::{ChildKind, ResourceProfile};
use crate::spec::ResourceSpec;

pub const KEY: &str = "infinispan";

const CONTAINER_ATTRS: &[&str] = &[
    "default-cache",
    "aliases",
    "jndi-name",
    "module",
    "statistics-enabled",
];

const TRANSPORT_ATTRS: &[&str] = &["channel", "stack", "cluster", "lock-timeout"];

const CACHE_BASE_ATTRS: &[&str] = &["jndi-name", "module", "statistics-enabled"];

const CLUSTERED_CACHE_ATTRS: &[&str] =
    &["mode", "queue-size", "queue-flush-interval", "remote-timeout"];

const DISTRIBUTED_CACHE_ATTRS: &[&str] = &[
    "owners",
    "segments",
    "l1-lifespan",
    "capacity-factor",
    "consistent-hash-strategy",
];

/// Per-cache configuration components and their attribute sets.
const COMPONENTS: &[(&str, &[&str])] = &[
    ("locking", &["isolation", "striping", "acquire-timeout", "concurrency-level"]),
    ("transaction", &["mode", "stop-timeout", "locking"]),
    ("eviction", &["strategy", "max-entries"]),
    ("expiration", &["max-idle", "lifespan", "interval"]),
    ("partition-handling", &["enabled"]),
    ("state-transfer", &["timeout", "chunk-size"]),
];

fn container_template() -> PathTemplate {
    PathTemplate::new()
        .fixed("subsystem", "infinispan")
        .wildcard("cache-container")
}

fn container_profile() -> ResourceProfile {
    ResourceProfile::new("cache-container", container_template())
        .attrs(CONTAINER_ATTRS)
        .child("transport", ChildKind::Component(transport_profile()))
        .child("caches", ChildKind::Custom(sync_caches))
}

fn transport_profile() -> ResourceProfile {
    ResourceProfile::new(
        "transport",
        container_template().fixed("transport", "TRANSPORT"),
    )
    .fixed_name("TRANSPORT")
    .attrs(TRANSPORT_ATTRS)
}

fn component_profile(cache_kind: &'static str, name: &'static str, attrs: &[&'static str]) -> ResourceProfile {
    ResourceProfile::new(
        "component",
        container_template()
            .wildcard(cache_kind)
            .fixed("component", name),
    )
    .fixed_name(name)
    .attrs(attrs)
}

fn cache_profile(cache_kind: &'static str) -> ResourceProfile {
    let mut profile = ResourceProfile::new(
        cache_kind,
        container_template().wildcard(cache_kind),
    )
    .attrs(CACHE_BASE_ATTRS);
    for &(name, attrs) in COMPONENTS {
        profile = profile.child(name, ChildKind::Component(component_profile(cache_kind, name, attrs)));
    }
    profile
}

fn profile_for_cache_type(cache_type: &str) -> Result<ResourceProfile> {
    match cache_type {
        "local-cache" => Ok(cache_profile("local-cache")),
        "replicated-cache" => Ok(cache_profile("replicated-cache").attrs(CLUSTERED_CACHE_ATTRS)),
        "invalidation-cache" => {
            Ok(cache_profile("invalidation-cache").attrs(CLUSTERED_CACHE_ATTRS))
        }
        "distributed-cache" => Ok(cache_profile("distributed-cache")
            .attrs(CLUSTERED_CACHE_ATTRS)
            .attrs(DISTRIBUTED_CACHE_ATTRS)),
        other => Err(Error::Parameter(format!("unknown cache type {other}"))),
    }
}

/// Child handler for a container's `caches` list: the declared `type`
/// member selects the cache family profile.
fn sync_caches(
    client: &dyn ManagementClient,
    lineage: &[&str],
    section: &Json,
) -> Result<Vec<ChangeRecord>> {
    let mut records = Vec::new();
    for spec in ResourceSpec::list_from(section)? {
        let cache_type = spec.require_str("type")?;
        let profile = profile_for_cache_type(cache_type)?;
        records.extend(ensure(client, &profile, lineage, &spec.without(&["type"]))?);
    }
    Ok(records)
}

/// Converge the `infinispan` section.
pub fn apply(client: &dyn ManagementClient, section: &Json) -> Result<Vec<ChangeRecord>> {
    let sections = section.as_object().ok_or_else(|| {
        Error::Parameter("infinispan configuration must be a mapping".to_string())
    })?;
    let mut records = Vec::new();
    for (key, value) in sections {
        match key.as_str() {
            "cache-container" => {
                for spec in ResourceSpec::list_from(value)? {
                    records.extend(ensure(client, &container_profile(), &[], &spec)?);
                }
            }
            other => {
                return Err(Error::Parameter(format!(
                    "infinispan configuration does not support the key {other}"
                )));
            }
        }
    }
    Ok(records)
}

//! Datasources subsystem.
//!
//! Handles `data-source` and `jdbc-driver` declarations under the
//! `datasources` section.

use dmr::{Error, ManagementClient, PathTemplate, Result};
use serde_json::Value as Json;

use crate::changes::ChangeRecord;
use crate::lifecycle::ensure;
use crate::profile::ResourceProfile;
use crate::spec::ResourceSpec;

pub const KEY: &str = "datasources";

/// Attributes a data-source declaration may carry.
const DATASOURCE_ATTRS: &[&str] = &[
    "connection-url",
    "driver-name",
    "driver-class",
    "datasource-class",
    "jndi-name",
    "enabled",
    "use-java-context",
    "user-name",
    "password",
    "credential-reference",
    "security-domain",
    "min-pool-size",
    "max-pool-size",
    "initial-pool-size",
    "pool-prefill",
    "pool-use-strict-min",
    "pool-fair",
    "flush-strategy",
    "idle-timeout-minutes",
    "query-timeout",
    "prepared-statements-cache-size",
    "share-prepared-statements",
    "track-statements",
    "transaction-isolation",
    "validate-on-match",
    "background-validation",
    "background-validation-millis",
    "valid-connection-checker-class-name",
    "valid-connection-checker-properties",
    "check-valid-connection-sql",
    "exception-sorter-class-name",
    "exception-sorter-properties",
    "stale-connection-checker-class-name",
    "stale-connection-checker-properties",
    "blocking-timeout-wait-millis",
    "url-delimiter",
    "url-selector-strategy-class-name",
    "use-fast-fail",
    "use-ccm",
    "use-try-lock",
    "jta",
    "spy",
    "allocation-retry",
    "allocation-retry-wait-millis",
    "allow-multiple-users",
    "connectable",
    "connection-listener-class",
    "connection-listener-property",
    "connection-properties",
    "statistics-enabled",
    "new-connection-sql",
    "set-tx-query-timeout",
    "tracking",
];

const JDBC_DRIVER_ATTRS: &[&str] = &[
    "driver-name",
    "driver-module-name",
    "module-slot",
    "driver-class-name",
    "driver-datasource-class-name",
    "driver-xa-datasource-class-name",
    "driver-major-version",
    "driver-minor-version",
];

fn datasource_profile() -> ResourceProfile {
    ResourceProfile::new(
        "datasource",
        PathTemplate::new()
            .fixed("subsystem", "datasources")
            .wildcard("data-source"),
    )
    .attrs(DATASOURCE_ATTRS)
}

fn jdbc_driver_profile() -> ResourceProfile {
    ResourceProfile::new(
        "jdbc-driver",
        PathTemplate::new()
            .fixed("subsystem", "datasources")
            .wildcard("jdbc-driver"),
    )
    .attrs(JDBC_DRIVER_ATTRS)
}

/// Converge the `datasources` section.
pub fn apply(client: &dyn ManagementClient, section: &Json) -> Result<Vec<ChangeRecord>> {
    let sections = section.as_object().ok_or_else(|| {
        Error::Parameter("datasources configuration must be a mapping".to_string())
    })?;
    let mut records = Vec::new();
    for (key, value) in sections {
        let profile = match key.as_str() {
            "data-source" => datasource_profile(),
            "jdbc-driver" => jdbc_driver_profile(),
            other => {
                return Err(Error::Parameter(format!(
                    "datasources configuration does not support the key {other}"
                )));
            }
        };
        for spec in ResourceSpec::list_from(value)? {
            records.extend(ensure(client, &profile, &[], &spec)?);
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::Action;
    use crate::testutil::ScriptedClient;
    use dmr::CmdResult;
    use serde_json::json;

    #[test]
    fn test_new_datasource_is_added_with_params() {
        let client = ScriptedClient::new()
            .expect(
                "/subsystem=datasources/data-source=TestDS:read-resource(recursive=true)",
                CmdResult::failed("WFLYCTL0216: not found"),
            )
            .expect(
                "/subsystem=datasources/data-source=TestDS:add(connection-url=\"jdbc:h2:mem:test\", driver-name=\"h2\", jndi-name=\"java:jboss/datasources/TestDS\")",
                CmdResult::ok_empty(),
            );
        let section = json!({
            "data-source": [{
                "name": "TestDS",
                "connection-url": "jdbc:h2:mem:test",
                "driver-name": "h2",
                "jndi-name": "java:jboss/datasources/TestDS"
            }]
        });
        let records = apply(&client, &section).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, "datasource");
        assert_eq!(records[0].identifier, "TestDS");
        assert_eq!(records[0].action, Action::Add);
        assert_eq!(
            records[0].params.as_deref(),
            Some("connection-url=\"jdbc:h2:mem:test\", driver-name=\"h2\", jndi-name=\"java:jboss/datasources/TestDS\"")
        );
        client.assert_done();
    }

    #[test]
    fn test_existing_datasource_connection_url_is_updated() {
        let client = ScriptedClient::new()
            .expect(
                "/subsystem=datasources/data-source=ExampleDS:read-resource(recursive=true)",
                CmdResult::ok(json!({
                    "connection-url": "jdbc:h2:mem:test",
                    "driver-name": "h2",
                    "enabled": true
                })),
            )
            .expect(
                "/subsystem=datasources/data-source=ExampleDS:write-attribute(name=connection-url, value=\"jdbc:h2:mem:update\")",
                CmdResult::ok_empty(),
            );
        let section = json!({
            "data-source": {
                "name": "ExampleDS",
                "connection-url": "jdbc:h2:mem:update",
                "driver-name": "h2"
            }
        });
        let records = apply(&client, &section).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, Action::Update);
        let change = &records[0].changes[0];
        assert_eq!(change.attribute, "connection-url");
        assert_eq!(change.old_value, Some(json!("jdbc:h2:mem:test")));
        assert_eq!(change.new_value, Some(json!("jdbc:h2:mem:update")));
        client.assert_done();
    }

    #[test]
    fn test_reapplying_the_same_declaration_is_idempotent() {
        let section = json!({
            "data-source": {
                "name": "ExampleDS",
                "connection-url": "jdbc:h2:mem:test",
                "enabled": true
            }
        });
        let live = json!({"connection-url": "jdbc:h2:mem:test", "enabled": true});
        let client = ScriptedClient::new().expect(
            "/subsystem=datasources/data-source=ExampleDS:read-resource(recursive=true)",
            CmdResult::ok(live),
        );
        let records = apply(&client, &section).unwrap();
        assert!(records.is_empty());
        client.assert_done();
    }

    #[test]
    fn test_jdbc_driver_add() {
        let client = ScriptedClient::new()
            .expect(
                "/subsystem=datasources/jdbc-driver=postgresql:read-resource(recursive=true)",
                CmdResult::failed("WFLYCTL0216: not found"),
            )
            .expect(
                "/subsystem=datasources/jdbc-driver=postgresql:add(driver-name=\"postgresql\", driver-module-name=\"org.postgresql\")",
                CmdResult::ok_empty(),
            );
        let section = json!({
            "jdbc-driver": [{
                "name": "postgresql",
                "driver-name": "postgresql",
                "driver-module-name": "org.postgresql"
            }]
        });
        let records = apply(&client, &section).unwrap();
        assert_eq!(records[0].kind, "jdbc-driver");
        assert_eq!(records[0].action, Action::Add);
        client.assert_done();
    }

    #[test]
    fn test_unknown_section_key_is_rejected() {
        let client = ScriptedClient::new();
        let err = apply(&client, &json!({"xa-data-source": []})).unwrap_err();
        assert!(matches!(err, Error::Parameter(_)));
    }
}

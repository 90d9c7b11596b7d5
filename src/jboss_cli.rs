//! Transport over the `jboss-cli` launcher.
//!
//! Each management command is executed as a one-shot CLI invocation with
//! `--output-json`, and the printed operation response is parsed into a
//! [`CmdResult`]. Launch failures and connection refusals surface as
//! [`dmr::Error::Connection`] so the session layer can retry them.

use std::process::Command;

use dmr::{CmdResult, Connector, Error, ManagementClient, Result};
use serde_json::Value as Json;

/// How to reach the management CLI.
#[derive(Debug, Clone)]
pub struct CliOptions {
    /// Launcher binary, e.g. `jboss-cli.sh`.
    pub command: String,
    /// Controller address (`host:port`), when not the launcher default.
    pub controller: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Launcher connection timeout in milliseconds.
    pub timeout_ms: Option<u64>,
}

/// A connected client shelling out to the CLI launcher per command.
pub struct CliClient {
    options: CliOptions,
}

impl CliClient {
    fn invoke(&self, command: &str) -> Result<std::process::Output> {
        let mut launcher = Command::new(&self.options.command);
        launcher
            .arg("--connect")
            .arg("--output-json")
            .arg(format!("--command={command}"));
        if let Some(controller) = &self.options.controller {
            launcher.arg(format!("--controller={controller}"));
        }
        if let Some(user) = &self.options.user {
            launcher.arg(format!("--user={user}"));
        }
        if let Some(password) = &self.options.password {
            launcher.arg(format!("--password={password}"));
        }
        if let Some(timeout) = self.options.timeout_ms {
            launcher.arg(format!("--timeout={timeout}"));
        }
        launcher.output().map_err(|err| {
            Error::Connection(format!("failed to launch {}: {err}", self.options.command))
        })
    }
}

impl ManagementClient for CliClient {
    fn execute(&self, command: &str) -> Result<CmdResult> {
        let output = self.invoke(command)?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_launcher_failure(stderr.trim(), stdout.trim()));
        }
        parse_response(stdout.trim())
    }
}

/// Parse the operation response the launcher printed.
fn parse_response(stdout: &str) -> Result<CmdResult> {
    let response: Json = serde_json::from_str(stdout)
        .map_err(|err| Error::Operation(format!("unparseable CLI response: {err}")))?;
    let success = response
        .get("outcome")
        .and_then(Json::as_str)
        .is_some_and(|outcome| outcome == "success");
    let payload = response.get("result").cloned();
    let failure = response.get("failure-description").map(|description| {
        description
            .as_str()
            .map_or_else(|| description.to_string(), str::to_string)
    });
    Ok(CmdResult {
        success,
        payload,
        failure,
    })
}

fn classify_launcher_failure(stderr: &str, stdout: &str) -> Error {
    let combined = if stderr.is_empty() { stdout } else { stderr };
    let lowered = combined.to_lowercase();
    if lowered.contains("failed to connect")
        || lowered.contains("connection refused")
        || lowered.contains("connection timed out")
    {
        Error::Connection(combined.to_string())
    } else {
        Error::Operation(combined.to_string())
    }
}

/// Connector probing the server once before handing out a client.
pub struct CliConnector {
    options: CliOptions,
}

impl CliConnector {
    pub fn new(options: CliOptions) -> Self {
        Self { options }
    }
}

impl Connector for CliConnector {
    fn mode(&self) -> &str {
        "standalone"
    }

    fn connect(&mut self) -> Result<Box<dyn ManagementClient>> {
        let client = CliClient {
            options: self.options.clone(),
        };
        // Round trip once so connection failures surface here, where
        // the session retry policy applies.
        client.run(":read-attribute(name=launch-type)")?;
        Ok(Box::new(client))
    }
}

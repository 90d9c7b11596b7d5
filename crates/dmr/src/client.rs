//! Management client abstraction.
//!
//! [`ManagementClient`] is the seam between the reconciliation engine and
//! the transport that actually executes commands. The binary implements
//! it over the `jboss-cli` launcher; tests script it.

use serde_json::Value as Json;

use crate::error::{Error, Result};
use crate::path::{Command, ResourcePath};
use crate::value::ModelValue;

/// Outcome of one executed command, before classification.
///
/// `success` mirrors the operation `outcome`; `failure` carries the
/// server's failure description when the outcome was not `success`.
#[derive(Debug, Clone)]
pub struct CmdResult {
    pub success: bool,
    pub payload: Option<Json>,
    pub failure: Option<String>,
}

impl CmdResult {
    pub fn ok(payload: Json) -> Self {
        Self {
            success: true,
            payload: Some(payload),
            failure: None,
        }
    }

    /// Successful operation with no result node.
    pub fn ok_empty() -> Self {
        Self {
            success: true,
            payload: None,
            failure: None,
        }
    }

    pub fn failed(description: &str) -> Self {
        Self {
            success: false,
            payload: None,
            failure: Some(description.to_string()),
        }
    }
}

/// Executes management commands against a server.
///
/// `execute` is the single transport method; the remaining operations
/// are derived from it and shared by every implementation.
pub trait ManagementClient {
    /// Send one command string and report its raw outcome.
    ///
    /// Transport-level failures are errors; operation-level failures are
    /// returned as an unsuccessful [`CmdResult`].
    fn execute(&self, command: &str) -> Result<CmdResult>;

    /// Execute and decode, turning operation failures into classified errors.
    fn run(&self, command: &str) -> Result<ModelValue> {
        log::debug!("executing: {command}");
        let result = self.execute(command)?;
        if result.success {
            Ok(result
                .payload
                .as_ref()
                .map_or(ModelValue::Undefined, ModelValue::from_json))
        } else {
            Err(Error::from_failure(command, result.failure.as_deref()))
        }
    }

    /// Read the resource at `path`, recursively when asked.
    fn read_resource(&self, path: &ResourcePath, recursive: bool) -> Result<ModelValue> {
        let command = Command::new(path, "read-resource")
            .arg("recursive", &Json::Bool(recursive))
            .render();
        self.run(&command)
    }

    /// Names of the children of `path` with the given child type.
    ///
    /// A missing parent yields an empty list rather than an error; this
    /// call is used as an existence probe.
    fn read_children_names(&self, path: &ResourcePath, child_type: &str) -> Result<Vec<String>> {
        let command = Command::new(path, "read-children-names")
            .raw_args(&format!("child-type={child_type}"))
            .render();
        match self.run(&command) {
            Ok(ModelValue::List(items)) => Ok(items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()),
            Ok(_) => Ok(Vec::new()),
            Err(Error::NotFound(_)) => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }

    /// Remove the resource at `path`. Removing a missing resource is a
    /// [`Error::NotFound`], which callers treating absence as the goal
    /// state swallow themselves.
    fn remove(&self, path: &ResourcePath) -> Result<ModelValue> {
        self.run(&Command::new(path, "remove").render())
    }

    /// Add a resource at `path` with a pre-rendered parameter fragment.
    fn add(&self, path: &ResourcePath, params: &str) -> Result<ModelValue> {
        self.run(&Command::new(path, "add").raw_args(params).render())
    }
}

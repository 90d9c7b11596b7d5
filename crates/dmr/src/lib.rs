//! # dmr
//!
//! Typed client layer for the JBoss/WildFly management CLI protocol.
//!
//! This crate provides:
//! - Decoding management JSON payloads into [`ModelValue`] nodes
//! - Resource addressing and the command grammar ([`ResourcePath`], [`Command`])
//! - The [`ManagementClient`] trait the reconciliation engine drives
//! - Session lifecycle with bounded connection retry ([`Session`])
//! - Failure-description classification into a typed [`Error`] taxonomy
//! - Key transcoding between declaration documents and wire form
//!
//! ## Example
//!
//! ```no_run
//! use dmr::{ManagementClient, ResourcePath};
//!
//! fn probe(client: &dyn ManagementClient) -> dmr::Result<bool> {
//!     let path = ResourcePath::new().child("subsystem", "datasources");
//!     match client.read_resource(&path, false) {
//!         Ok(_) => Ok(true),
//!         Err(dmr::Error::NotFound(_)) => Ok(false),
//!         Err(err) => Err(err),
//!     }
//! }
//! ```

#![warn(clippy::all)]

pub mod client;
pub mod error;
pub mod keys;
pub mod path;
pub mod session;
pub mod value;

pub use client::{CmdResult, ManagementClient};
pub use error::{Error, Result};
pub use path::{Command, PathTemplate, ResourcePath, encode_params, encode_value};
pub use session::{Connector, RetryPolicy, Session, SessionEvent, SessionListener};
pub use value::ModelValue;

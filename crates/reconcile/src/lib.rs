//! # reconcile
//!
//! Declarative resource reconciliation for WildFly/JBoss managed
//! configuration: declare desired state, probe live state through a
//! [`dmr::ManagementClient`], converge, and report every change.
//!
//! ## Core concepts
//!
//! - **ResourceSpec**: one resource's declared configuration
//! - **ResourceProfile**: a resource type's address, attribute set and children
//! - **ensure**: drive one resource to its declared goal state
//! - **Dispatcher**: route a whole configuration document to subsystem handlers
//! - **ChangeTree**: everything that was changed, grouped by section
//!
//! ## Example
//!
//! ```no_run
//! use serde_json::json;
//!
//! fn converge(client: &dyn dmr::ManagementClient) -> Result<(), reconcile::DispatchError> {
//!     let document = json!({
//!         "datasources": {
//!             "data_source": [{
//!                 "name": "TestDS",
//!                 "connection_url": "jdbc:h2:mem:test",
//!                 "driver_name": "h2"
//!             }]
//!         }
//!     });
//!     let tree = reconcile::standard_dispatcher().dispatch(client, &document)?;
//!     for (section, records) in &tree {
//!         println!("{section}: {} change(s)", records.len());
//!     }
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod attr;
pub mod changes;
pub mod coerce;
pub mod dispatch;
pub mod lifecycle;
pub mod ordered;
pub mod profile;
pub mod spec;
pub mod subsystems;

#[cfg(test)]
pub(crate) mod testutil;

pub use changes::{Action, AttributeChange, ChangeRecord, ChangeTree};
pub use dispatch::{DispatchError, Dispatcher, Handler};
pub use lifecycle::{ensure, ensure_component};
pub use profile::{ChildKind, ResourceProfile};
pub use spec::{DesiredState, ResourceSpec};
pub use subsystems::standard_dispatcher;

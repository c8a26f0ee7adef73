//! lagoon-sync-core - the reconciliation engine behind `lagoon-sync`.
//!
//! # Main Components
//!
//! - [`models`] - the typed [`Document`] (groups, users, notification channels, projects)
//! - [`parser`] - raw YAML/JSON documents to and from [`Document`]
//! - [`planner`] - dependency-ordered [`Operation`]s for a document
//! - [`reconciler`] - applies a plan through a [`RequestExecutor`] under a [`FailurePolicy`]
//! - [`snapshot`] - platform query results back into a [`Document`]
//!
//! # Import
//!
//! ```rust,ignore
//! let document = parser::parse(&bytes)?;
//! let plan = planner::plan(&document);
//! let result = Reconciler::new(client)
//!     .apply(&plan, FailurePolicy::ContinueCollectingErrors)
//!     .await;
//! ```
//!
//! # Export
//!
//! ```rust,ignore
//! let snapshot = Snapshot::from_json(&raw)?;
//! let document = snapshot::translate(&snapshot, &SkipExport::default())?;
//! let yaml = parser::serialize(&document)?;
//! ```

pub mod error;
pub mod models;
pub mod parser;
pub mod planner;
pub mod reconciler;
pub mod snapshot;

pub use error::{ApplyError, ImportError, Result};
pub use models::*;
pub use parser::{parse, parse_str, serialize};
pub use planner::{
    plan, plan_with_options, EntityRef, Operation, OperationKind, Payload, PlanOptions,
};
pub use reconciler::{
    to_variables, ApplyResult, FailedOperation, FailurePolicy, Reconciler, RequestExecutor,
};
pub use snapshot::{translate, DocumentBuilder, SkipExport, Snapshot};

pub use async_trait::async_trait;

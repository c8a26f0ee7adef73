//! Domain models for a lagoon-sync document.
//!
//! # Core Concepts
//!
//! Every entity is addressed by a human-readable key rather than a platform id,
//! because the document is written and reviewed by people:
//!
//! - [`Group`]: addressed by name. Referenced by users and projects.
//! - [`User`]: addressed by email. Carries its [`GroupMembership`]s.
//! - [`NotificationChannel`]: addressed by name within its [`NotificationKind`].
//! - [`Project`]: addressed by name. References groups and notification channels.
//! - [`Document`]: the container for all four categories.
//!
//! References between entities are plain names. They are not resolved when a
//! document is parsed, since the platform may already hold the target from an
//! earlier import.

mod document;
mod group;
mod notification;
mod project;
mod user;

pub use document::*;
pub use group::*;
pub use notification::*;
pub use project::*;
pub use user::*;

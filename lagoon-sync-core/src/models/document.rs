use super::group::Group;
use super::notification::{NotificationChannel, NotificationKind};
use super::project::Project;
use super::user::User;

/// The declarative configuration for one import or export run.
///
/// Order inside each category is kept so output is deterministic, but it says
/// nothing about dependencies; the planner owns ordering. Notification
/// channels are partitioned by kind: only the order within one kind matters,
/// which is what the [`PartialEq`] impl compares.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub groups: Vec<Group>,
    pub users: Vec<User>,
    pub notifications: Vec<NotificationChannel>,
    pub projects: Vec<Project>,
}

impl Document {
    /// Channels of one kind, in document order.
    pub fn channels(&self, kind: NotificationKind) -> impl Iterator<Item = &NotificationChannel> {
        self.notifications.iter().filter(move |n| n.kind() == kind)
    }

    pub fn has_group(&self, name: &str) -> bool {
        self.groups.iter().any(|g| g.name == name)
    }

    pub fn has_user(&self, email: &str) -> bool {
        self.users.iter().any(|u| u.email == email)
    }

    pub fn has_channel(&self, kind: NotificationKind, name: &str) -> bool {
        self.channels(kind).any(|n| n.name() == name)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
            && self.users.is_empty()
            && self.notifications.is_empty()
            && self.projects.is_empty()
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.groups == other.groups
            && self.users == other.users
            && self.projects == other.projects
            && NotificationKind::ALL
                .iter()
                .all(|kind| self.channels(*kind).eq(other.channels(*kind)))
    }
}

impl Eq for Document {}

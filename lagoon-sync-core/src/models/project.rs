use std::collections::BTreeMap;

use super::notification::NotificationKind;

/// A project and the groups and notification channels attached to it.
#[derive(Debug, Clone)]
pub struct Project {
    pub name: String,
    pub git_url: String,
    /// Id of the target cluster (OpenShift/Kubernetes) the project deploys to.
    pub openshift: Option<u64>,
    /// Regex of branches that get environments, e.g. `master|develop`.
    pub branches: Option<String>,
    pub production_environment: Option<String>,
    pub groups: Vec<String>,
    /// Channel names per kind. A kind mapped to an empty list counts as absent:
    /// equality skips it and serialization leaves it out.
    pub notifications: BTreeMap<NotificationKind, Vec<String>>,
}

impl PartialEq for Project {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.git_url == other.git_url
            && self.openshift == other.openshift
            && self.branches == other.branches
            && self.production_environment == other.production_environment
            && self.groups == other.groups
            && linked(&self.notifications).eq(linked(&other.notifications))
    }
}

impl Eq for Project {}

fn linked(
    notifications: &BTreeMap<NotificationKind, Vec<String>>,
) -> impl Iterator<Item = (&NotificationKind, &Vec<String>)> {
    notifications.iter().filter(|(_, names)| !names.is_empty())
}

impl Project {
    pub fn new(name: impl Into<String>, git_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            git_url: git_url.into(),
            openshift: None,
            branches: None,
            production_environment: None,
            groups: Vec::new(),
            notifications: BTreeMap::new(),
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }

    pub fn with_notification(mut self, kind: NotificationKind, name: impl Into<String>) -> Self {
        self.notifications.entry(kind).or_default().push(name.into());
        self
    }
}

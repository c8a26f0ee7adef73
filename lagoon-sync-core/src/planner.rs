//! Turns a [`Document`] into the ordered list of remote operations.
//!
//! The categories form a fixed four-level order: groups, users (with their
//! memberships), notification channels, projects (with their group and
//! notification links). No category references a peer of its own kind, so
//! document order is kept within each level and no graph search is needed.

use serde::Serialize;

use crate::models::*;

/// One kind of remote mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    CreateGroup,
    CreateUser,
    AddUserToGroup,
    CreateNotification(NotificationKind),
    CreateProject,
    LinkProjectGroup,
    LinkProjectNotification(NotificationKind),
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateGroup => "create-group",
            Self::CreateUser => "create-user",
            Self::AddUserToGroup => "add-user-to-group",
            Self::CreateNotification(_) => "create-notification",
            Self::CreateProject => "create-project",
            Self::LinkProjectGroup => "link-project-group",
            Self::LinkProjectNotification(_) => "link-project-notification",
        }
    }

    /// Name of the remote procedure that performs this operation.
    pub fn procedure(&self) -> &'static str {
        match self {
            Self::CreateGroup => "addGroup",
            Self::CreateUser => "addUser",
            Self::AddUserToGroup => "addUserToGroup",
            Self::CreateNotification(NotificationKind::Slack) => "addNotificationSlack",
            Self::CreateNotification(NotificationKind::RocketChat) => "addNotificationRocketChat",
            Self::CreateNotification(NotificationKind::Email) => "addNotificationEmail",
            Self::CreateNotification(NotificationKind::MicrosoftTeams) => {
                "addNotificationMicrosoftTeams"
            }
            Self::CreateProject => "addProject",
            Self::LinkProjectGroup => "addGroupsToProject",
            Self::LinkProjectNotification(_) => "addNotificationToProject",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named entity, used to express what an operation creates or needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Group(String),
    User(String),
    Notification(NotificationKind, String),
    Project(String),
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Group(name) => write!(f, "group '{name}'"),
            Self::User(email) => write!(f, "user '{email}'"),
            Self::Notification(kind, name) => write!(f, "{kind} notification '{name}'"),
            Self::Project(name) => write!(f, "project '{name}'"),
        }
    }
}

/// Request payloads, one per operation kind.
///
/// Each serializes to a flat JSON object; that object is the variable map sent
/// with the remote procedure. Optional fields are skipped when unset so they
/// are omitted rather than sent as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Group {
        name: String,
    },
    User {
        email: String,
        #[serde(rename = "sshKey", skip_serializing_if = "Option::is_none")]
        ssh_key: Option<String>,
    },
    Membership {
        email: String,
        group: String,
        role: &'static str,
    },
    WebhookChannel {
        name: String,
        webhook: String,
        channel: String,
    },
    EmailChannel {
        name: String,
        #[serde(rename = "emailAddress")]
        email_address: String,
    },
    TeamsChannel {
        name: String,
        webhook: String,
    },
    Project {
        name: String,
        #[serde(rename = "gitUrl")]
        git_url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        openshift: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        branches: Option<String>,
        #[serde(
            rename = "productionEnvironment",
            skip_serializing_if = "Option::is_none"
        )]
        production_environment: Option<String>,
    },
    ProjectGroup {
        project: String,
        group: String,
    },
    ProjectNotification {
        project: String,
        #[serde(rename = "notificationType")]
        notification_type: &'static str,
        #[serde(rename = "notificationName")]
        notification_name: String,
    },
}

/// One atomic remote mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub kind: OperationKind,
    pub payload: Payload,
    /// Human-readable form, e.g. `add-user-to-group(usera@example.com, example-com)`.
    pub description: String,
    /// The entity this operation brings into existence, if any.
    pub creates: Option<EntityRef>,
    /// Entities that must exist before this operation can succeed.
    pub requires: Vec<EntityRef>,
}

impl Operation {
    fn new(kind: OperationKind, args: &[&str], payload: Payload) -> Self {
        Self {
            kind,
            payload,
            description: format!("{}({})", kind.as_str(), args.join(", ")),
            creates: None,
            requires: Vec::new(),
        }
    }

    fn creating(mut self, entity: EntityRef) -> Self {
        self.creates = Some(entity);
        self
    }

    fn requiring(mut self, entity: EntityRef) -> Self {
        self.requires.push(entity);
        self
    }
}

/// Knobs that shape payloads without touching the document.
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    /// Target platform id for projects that do not name one.
    pub default_openshift: Option<u64>,
}

type CategoryHandler = fn(&Document, &PlanOptions, &mut Vec<Operation>);

/// Category handlers, earliest first.
const CATEGORY_ORDER: [(&str, CategoryHandler); 4] = [
    ("groups", plan_groups),
    ("users", plan_users),
    ("notifications", plan_notifications),
    ("projects", plan_projects),
];

/// Plans a document with default options.
pub fn plan(document: &Document) -> Vec<Operation> {
    plan_with_options(document, &PlanOptions::default())
}

pub fn plan_with_options(document: &Document, options: &PlanOptions) -> Vec<Operation> {
    let mut operations = Vec::new();
    for (category, handler) in CATEGORY_ORDER {
        let before = operations.len();
        handler(document, options, &mut operations);
        tracing::debug!(
            category,
            operations = operations.len() - before,
            "planned category"
        );
    }
    operations
}

fn plan_groups(document: &Document, _options: &PlanOptions, ops: &mut Vec<Operation>) {
    for group in &document.groups {
        ops.push(
            Operation::new(
                OperationKind::CreateGroup,
                &[&group.name],
                Payload::Group {
                    name: group.name.clone(),
                },
            )
            .creating(EntityRef::Group(group.name.clone())),
        );
    }
}

fn plan_users(document: &Document, _options: &PlanOptions, ops: &mut Vec<Operation>) {
    for user in &document.users {
        ops.push(
            Operation::new(
                OperationKind::CreateUser,
                &[&user.email],
                Payload::User {
                    email: user.email.clone(),
                    ssh_key: user.ssh_key.clone(),
                },
            )
            .creating(EntityRef::User(user.email.clone())),
        );

        for membership in &user.groups {
            ops.push(
                Operation::new(
                    OperationKind::AddUserToGroup,
                    &[&user.email, &membership.group],
                    Payload::Membership {
                        email: user.email.clone(),
                        group: membership.group.clone(),
                        role: membership.role.as_graphql(),
                    },
                )
                .requiring(EntityRef::User(user.email.clone()))
                .requiring(EntityRef::Group(membership.group.clone())),
            );
        }
    }
}

fn plan_notifications(document: &Document, _options: &PlanOptions, ops: &mut Vec<Operation>) {
    for kind in NotificationKind::ALL {
        for channel in document.channels(kind) {
            let payload = match channel {
                NotificationChannel::Slack {
                    name,
                    webhook,
                    channel,
                }
                | NotificationChannel::RocketChat {
                    name,
                    webhook,
                    channel,
                } => Payload::WebhookChannel {
                    name: name.clone(),
                    webhook: webhook.clone(),
                    channel: channel.clone(),
                },
                NotificationChannel::Email {
                    name,
                    email_address,
                } => Payload::EmailChannel {
                    name: name.clone(),
                    email_address: email_address.clone(),
                },
                NotificationChannel::MicrosoftTeams { name, webhook } => Payload::TeamsChannel {
                    name: name.clone(),
                    webhook: webhook.clone(),
                },
            };
            ops.push(
                Operation::new(
                    OperationKind::CreateNotification(kind),
                    &[kind.as_str(), channel.name()],
                    payload,
                )
                .creating(EntityRef::Notification(kind, channel.name().to_string())),
            );
        }
    }
}

fn plan_projects(document: &Document, options: &PlanOptions, ops: &mut Vec<Operation>) {
    for project in &document.projects {
        ops.push(
            Operation::new(
                OperationKind::CreateProject,
                &[&project.name],
                Payload::Project {
                    name: project.name.clone(),
                    git_url: project.git_url.clone(),
                    openshift: project.openshift.or(options.default_openshift),
                    branches: project.branches.clone(),
                    production_environment: project.production_environment.clone(),
                },
            )
            .creating(EntityRef::Project(project.name.clone())),
        );

        for group in &project.groups {
            ops.push(
                Operation::new(
                    OperationKind::LinkProjectGroup,
                    &[&project.name, group],
                    Payload::ProjectGroup {
                        project: project.name.clone(),
                        group: group.clone(),
                    },
                )
                .requiring(EntityRef::Project(project.name.clone()))
                .requiring(EntityRef::Group(group.clone())),
            );
        }

        for (kind, names) in &project.notifications {
            for name in names {
                ops.push(
                    Operation::new(
                        OperationKind::LinkProjectNotification(*kind),
                        &[&project.name, kind.as_str(), name],
                        Payload::ProjectNotification {
                            project: project.name.clone(),
                            notification_type: kind.as_graphql(),
                            notification_name: name.clone(),
                        },
                    )
                    .requiring(EntityRef::Project(project.name.clone()))
                    .requiring(EntityRef::Notification(*kind, name.clone())),
                );
            }
        }
    }
}

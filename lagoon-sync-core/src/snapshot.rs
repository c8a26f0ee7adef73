//! Reduces platform query results back into a [`Document`].
//!
//! A snapshot is the JSON body of an `allProjects` or `projectByName` query.
//! Each project is folded into a [`DocumentBuilder`], which de-duplicates
//! groups, users and channels shared between projects. A [`SkipExport`]
//! filter drops whole categories together with every reference to them, so
//! the result never points at something it left out.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ImportError, Result};
use crate::models::*;

/// Categories left out of an export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipExport {
    pub users: bool,
    pub groups: bool,
    /// All notification kinds.
    pub notifications: bool,
    pub slack: bool,
    pub rocketchat: bool,
}

impl SkipExport {
    pub fn skips_kind(&self, kind: NotificationKind) -> bool {
        self.notifications
            || match kind {
                NotificationKind::Slack => self.slack,
                NotificationKind::RocketChat => self.rocketchat,
                NotificationKind::Email | NotificationKind::MicrosoftTeams => false,
            }
    }
}

/// Projects as returned by the platform.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub projects: Vec<SnapshotProject>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotProject {
    pub name: String,
    pub git_url: String,
    #[serde(default)]
    pub openshift: Option<SnapshotOpenshift>,
    #[serde(default)]
    pub branches: Option<String>,
    #[serde(default)]
    pub production_environment: Option<String>,
    #[serde(default)]
    pub notifications: Option<Vec<SnapshotNotification>>,
    #[serde(default)]
    pub groups: Option<Vec<SnapshotGroup>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotOpenshift {
    pub id: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "__typename")]
pub enum SnapshotNotification {
    NotificationSlack {
        name: String,
        webhook: String,
        channel: String,
    },
    NotificationRocketChat {
        name: String,
        webhook: String,
        channel: String,
    },
    NotificationEmail {
        name: String,
        #[serde(rename = "emailAddress")]
        email_address: String,
    },
    NotificationMicrosoftTeams {
        name: String,
        webhook: String,
    },
    #[serde(other)]
    Unsupported,
}

impl SnapshotNotification {
    fn to_channel(&self) -> Option<NotificationChannel> {
        let channel = match self {
            Self::NotificationSlack {
                name,
                webhook,
                channel,
            } => NotificationChannel::Slack {
                name: name.clone(),
                webhook: webhook.clone(),
                channel: channel.clone(),
            },
            Self::NotificationRocketChat {
                name,
                webhook,
                channel,
            } => NotificationChannel::RocketChat {
                name: name.clone(),
                webhook: webhook.clone(),
                channel: channel.clone(),
            },
            Self::NotificationEmail {
                name,
                email_address,
            } => NotificationChannel::Email {
                name: name.clone(),
                email_address: email_address.clone(),
            },
            Self::NotificationMicrosoftTeams { name, webhook } => {
                NotificationChannel::MicrosoftTeams {
                    name: name.clone(),
                    webhook: webhook.clone(),
                }
            }
            Self::Unsupported => return None,
        };
        Some(channel)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotGroup {
    pub name: String,
    #[serde(default)]
    pub members: Option<Vec<SnapshotMember>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotMember {
    pub user: SnapshotUser,
    pub role: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotUser {
    pub email: String,
    #[serde(default)]
    pub ssh_keys: Option<Vec<SnapshotSshKey>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSshKey {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub key_type: Option<String>,
    pub key_value: String,
}

impl SnapshotSshKey {
    /// Formats the key as an OpenSSH public key line.
    pub fn to_line(&self) -> String {
        let value = self.key_value.trim();
        if value.starts_with("ssh-") || value.starts_with("ecdsa-") {
            return value.to_string();
        }
        let key_type = self
            .key_type
            .as_deref()
            .map(|t| t.to_ascii_lowercase().replace('_', "-"))
            .unwrap_or_else(|| "ssh-rsa".to_string());
        match self.name.as_deref().filter(|n| !n.is_empty()) {
            Some(name) => format!("{key_type} {value} {name}"),
            None => format!("{key_type} {value}"),
        }
    }
}

impl Snapshot {
    pub fn from_json(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| ImportError::MalformedSnapshot(format!("invalid JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Accepts the body with or without the GraphQL `data` envelope.
    pub fn from_value(mut value: Value) -> Result<Self> {
        if let Some(data) = value.get_mut("data").map(Value::take) {
            value = data;
        }

        if let Some(all) = value.get_mut("allProjects").map(Value::take) {
            if all.is_null() {
                return Ok(Self::default());
            }
            let projects = serde_json::from_value(all)
                .map_err(|e| ImportError::MalformedSnapshot(e.to_string()))?;
            return Ok(Self { projects });
        }

        if let Some(one) = value.get_mut("projectByName").map(Value::take) {
            if one.is_null() {
                return Ok(Self::default());
            }
            let project = serde_json::from_value(one)
                .map_err(|e| ImportError::MalformedSnapshot(e.to_string()))?;
            return Ok(Self {
                projects: vec![project],
            });
        }

        Err(ImportError::MalformedSnapshot(
            "expected an `allProjects` or `projectByName` result".to_string(),
        ))
    }
}

/// Translates a whole snapshot.
pub fn translate(snapshot: &Snapshot, skip: &SkipExport) -> Result<Document> {
    let mut builder = DocumentBuilder::new(*skip);
    for project in &snapshot.projects {
        builder.add_project(project)?;
    }
    Ok(builder.finish())
}

/// Accumulates projects into one document, keeping each group, user and
/// channel once no matter how many projects share it.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    skip: SkipExport,
    document: Document,
}

impl DocumentBuilder {
    pub fn new(skip: SkipExport) -> Self {
        Self {
            skip,
            document: Document::default(),
        }
    }

    pub fn add_project(&mut self, project: &SnapshotProject) -> Result<()> {
        if self.document.projects.iter().any(|p| p.name == project.name) {
            tracing::debug!(project = %project.name, "project already translated");
            return Ok(());
        }

        // The platform creates and owns these; importing them again would fail.
        let default_group = format!("project-{}", project.name);
        let default_user = format!("default-user@{}", project.name);

        let groups: Vec<&SnapshotGroup> = project
            .groups
            .iter()
            .flatten()
            .filter(|g| g.name != default_group)
            .collect();

        let mut translated = Project {
            name: project.name.clone(),
            git_url: project.git_url.clone(),
            openshift: project.openshift.as_ref().map(|o| o.id),
            branches: project.branches.clone(),
            production_environment: project.production_environment.clone(),
            groups: Vec::new(),
            notifications: BTreeMap::new(),
        };

        if !self.skip.groups {
            for group in &groups {
                if !translated.groups.contains(&group.name) {
                    translated.groups.push(group.name.clone());
                }
                if !self.document.has_group(&group.name) {
                    self.document.groups.push(Group::new(group.name.clone()));
                }
            }
        }

        if !self.skip.users {
            for group in &groups {
                for member in group.members.iter().flatten() {
                    if member.user.email == default_user {
                        continue;
                    }
                    let role = GroupRole::from_str(&member.role).ok_or_else(|| {
                        ImportError::MalformedSnapshot(format!(
                            "unknown role '{}' for '{}' in group '{}'",
                            member.role, member.user.email, group.name
                        ))
                    })?;
                    let membership = (!self.skip.groups).then(|| GroupMembership {
                        group: group.name.clone(),
                        role,
                    });
                    self.add_user(&member.user, membership);
                }
            }
        }

        for notification in project.notifications.iter().flatten() {
            let Some(channel) = notification.to_channel() else {
                continue;
            };
            let kind = channel.kind();
            if self.skip.skips_kind(kind) {
                continue;
            }
            let names = translated.notifications.entry(kind).or_default();
            if !names.iter().any(|n| n == channel.name()) {
                names.push(channel.name().to_string());
            }
            if !self.document.has_channel(kind, channel.name()) {
                self.document.notifications.push(channel);
            }
        }

        self.document.projects.push(translated);
        Ok(())
    }

    fn add_user(&mut self, user: &SnapshotUser, membership: Option<GroupMembership>) {
        let ssh_key = user
            .ssh_keys
            .iter()
            .flatten()
            .next()
            .map(SnapshotSshKey::to_line);

        let index = match self
            .document
            .users
            .iter()
            .position(|u| u.email == user.email)
        {
            Some(index) => index,
            None => {
                self.document.users.push(User::new(user.email.clone()));
                self.document.users.len() - 1
            }
        };
        let target = &mut self.document.users[index];

        if target.ssh_key.is_none() {
            target.ssh_key = ssh_key;
        }
        if let Some(membership) = membership {
            if !target.groups.iter().any(|m| m.group == membership.group) {
                target.groups.push(membership);
            }
        }
    }

    pub fn finish(self) -> Document {
        self.document
    }
}

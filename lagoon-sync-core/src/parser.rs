//! Conversion between raw documents (YAML, or JSON as its subset) and the
//! typed [`Document`] model.
//!
//! The wire structs below mirror the on-disk shape exactly; everything the
//! model needs beyond "does it deserialize" (non-empty keys, unique names,
//! known roles and kinds) is checked afterwards in [`parse_str`].

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ImportError, Result};
use crate::models::*;

#[derive(Debug, Default, Serialize, Deserialize)]
struct RawDocument {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    groups: Vec<RawGroup>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    users: Vec<RawUserEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    slack: Vec<RawWebhookChannel>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    rocketchat: Vec<RawWebhookChannel>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    email: Vec<RawEmailChannel>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    microsoftteams: Vec<RawTeamsChannel>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    projects: Vec<RawProjectEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawGroup {
    name: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawUserEntry {
    user: RawUser,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    groups: Vec<RawMembership>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawUser {
    email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sshkey: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawMembership {
    name: String,
    role: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawWebhookChannel {
    name: String,
    webhook: String,
    channel: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawEmailChannel {
    name: String,
    emailaddress: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawTeamsChannel {
    name: String,
    webhook: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawProjectEntry {
    project: RawProject,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    notifications: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    groups: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawProject {
    name: String,
    giturl: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    openshift: Option<u64>,
    #[serde(
        default,
        deserialize_with = "strict_string",
        skip_serializing_if = "Option::is_none"
    )]
    branches: Option<String>,
    #[serde(
        default,
        deserialize_with = "strict_string",
        skip_serializing_if = "Option::is_none"
    )]
    productionenvironment: Option<String>,
}

/// Only YAML strings are accepted; `branches: 5` or `branches: true` must be
/// quoted to count.
fn strict_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    match Option::<serde_yaml::Value>::deserialize(deserializer)? {
        None | Some(serde_yaml::Value::Null) => Ok(None),
        Some(serde_yaml::Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string, found {other:?}"
        ))),
    }
}

/// Parses a raw document byte stream.
pub fn parse(raw: &[u8]) -> Result<Document> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| ImportError::MalformedDocument(format!("document is not UTF-8: {e}")))?;
    parse_str(text)
}

/// Parses a YAML (or JSON) document.
///
/// Dangling references are accepted: a project may name a group that is not in
/// the document because the platform may already have it.
pub fn parse_str(text: &str) -> Result<Document> {
    // An empty file (or one holding only comments) is an empty document.
    let value: serde_yaml::Value = serde_yaml::from_str(text).map_err(ImportError::from_yaml)?;
    if value.is_null() {
        return Ok(Document::default());
    }

    let raw: RawDocument = serde_yaml::from_str(text).map_err(ImportError::from_yaml)?;
    let document = from_raw(raw)?;
    check_unique(&document)?;
    Ok(document)
}

/// Serializes a document back to YAML.
///
/// Empty categories and unset optional fields are left out, so parsing the
/// output yields a document equal to the input.
pub fn serialize(document: &Document) -> Result<String> {
    serde_yaml::to_string(&to_raw(document)).map_err(|e| ImportError::Serialize(e.to_string()))
}

fn from_raw(raw: RawDocument) -> Result<Document> {
    let mut document = Document::default();

    for group in raw.groups {
        document.groups.push(Group::new(required("group name", group.name)?));
    }

    for entry in raw.users {
        let email = required("user email", entry.user.email)?;
        let mut groups = Vec::with_capacity(entry.groups.len());
        for membership in entry.groups {
            let role = GroupRole::from_str(&membership.role).ok_or_else(|| {
                ImportError::MalformedDocument(format!(
                    "user '{}' has unknown role '{}' in group '{}'",
                    email, membership.role, membership.name
                ))
            })?;
            groups.push(GroupMembership {
                group: required("membership group name", membership.name)?,
                role,
            });
        }
        document.users.push(User {
            email,
            ssh_key: entry.user.sshkey.filter(|k| !k.trim().is_empty()),
            groups,
        });
    }

    for c in raw.slack {
        document.notifications.push(NotificationChannel::Slack {
            name: required("slack name", c.name)?,
            webhook: c.webhook,
            channel: c.channel,
        });
    }
    for c in raw.rocketchat {
        document.notifications.push(NotificationChannel::RocketChat {
            name: required("rocketchat name", c.name)?,
            webhook: c.webhook,
            channel: c.channel,
        });
    }
    for c in raw.email {
        document.notifications.push(NotificationChannel::Email {
            name: required("email name", c.name)?,
            email_address: required("email address", c.emailaddress)?,
        });
    }
    for c in raw.microsoftteams {
        document.notifications.push(NotificationChannel::MicrosoftTeams {
            name: required("microsoftteams name", c.name)?,
            webhook: c.webhook,
        });
    }

    for entry in raw.projects {
        let name = required("project name", entry.project.name)?;
        let git_url = required("project giturl", entry.project.giturl)?;

        let mut notifications = BTreeMap::new();
        for (key, names) in entry.notifications {
            let kind = NotificationKind::from_str(&key).ok_or_else(|| {
                ImportError::MalformedDocument(format!(
                    "project '{name}' references unknown notification kind '{key}'"
                ))
            })?;
            if !names.is_empty() {
                notifications.insert(kind, names);
            }
        }

        document.projects.push(Project {
            name,
            git_url,
            openshift: entry.project.openshift,
            branches: entry.project.branches,
            production_environment: entry.project.productionenvironment,
            groups: entry.groups,
            notifications,
        });
    }

    Ok(document)
}

fn to_raw(document: &Document) -> RawDocument {
    let mut raw = RawDocument {
        groups: document
            .groups
            .iter()
            .map(|g| RawGroup {
                name: g.name.clone(),
            })
            .collect(),
        users: document
            .users
            .iter()
            .map(|u| RawUserEntry {
                user: RawUser {
                    email: u.email.clone(),
                    sshkey: u.ssh_key.clone(),
                },
                groups: u
                    .groups
                    .iter()
                    .map(|m| RawMembership {
                        name: m.group.clone(),
                        role: m.role.as_str().to_string(),
                    })
                    .collect(),
            })
            .collect(),
        projects: document
            .projects
            .iter()
            .map(|p| RawProjectEntry {
                project: RawProject {
                    name: p.name.clone(),
                    giturl: p.git_url.clone(),
                    openshift: p.openshift,
                    branches: p.branches.clone(),
                    productionenvironment: p.production_environment.clone(),
                },
                notifications: p
                    .notifications
                    .iter()
                    .filter(|(_, names)| !names.is_empty())
                    .map(|(kind, names)| (kind.as_str().to_string(), names.clone()))
                    .collect(),
                groups: p.groups.clone(),
            })
            .collect(),
        ..RawDocument::default()
    };

    for channel in &document.notifications {
        match channel {
            NotificationChannel::Slack {
                name,
                webhook,
                channel,
            } => raw.slack.push(RawWebhookChannel {
                name: name.clone(),
                webhook: webhook.clone(),
                channel: channel.clone(),
            }),
            NotificationChannel::RocketChat {
                name,
                webhook,
                channel,
            } => raw.rocketchat.push(RawWebhookChannel {
                name: name.clone(),
                webhook: webhook.clone(),
                channel: channel.clone(),
            }),
            NotificationChannel::Email {
                name,
                email_address,
            } => raw.email.push(RawEmailChannel {
                name: name.clone(),
                emailaddress: email_address.clone(),
            }),
            NotificationChannel::MicrosoftTeams { name, webhook } => {
                raw.microsoftteams.push(RawTeamsChannel {
                    name: name.clone(),
                    webhook: webhook.clone(),
                })
            }
        }
    }

    raw
}

fn required(field: &str, value: String) -> Result<String> {
    if value.trim().is_empty() {
        return Err(ImportError::MalformedDocument(format!(
            "{field} must not be empty"
        )));
    }
    Ok(value)
}

fn check_unique(document: &Document) -> Result<()> {
    ensure_unique("group", document.groups.iter().map(|g| g.name.as_str()))?;
    ensure_unique("user", document.users.iter().map(|u| u.email.as_str()))?;
    for kind in NotificationKind::ALL {
        ensure_unique(kind.as_str(), document.channels(kind).map(|n| n.name()))?;
    }
    ensure_unique("project", document.projects.iter().map(|p| p.name.as_str()))
}

fn ensure_unique<'a>(category: &str, names: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(ImportError::MalformedDocument(format!(
                "duplicate {category} '{name}'"
            )));
        }
    }
    Ok(())
}

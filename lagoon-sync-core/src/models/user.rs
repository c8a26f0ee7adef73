/// A platform user and the groups it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub email: String,
    /// Public key line, e.g. `ssh-ed25519 AAAA... user@host`.
    pub ssh_key: Option<String>,
    pub groups: Vec<GroupMembership>,
}

impl User {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ssh_key: None,
            groups: Vec::new(),
        }
    }

    pub fn with_ssh_key(mut self, key: impl Into<String>) -> Self {
        self.ssh_key = Some(key.into());
        self
    }

    pub fn with_membership(mut self, group: impl Into<String>, role: GroupRole) -> Self {
        self.groups.push(GroupMembership {
            group: group.into(),
            role,
        });
        self
    }
}

/// A user's role inside one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMembership {
    /// Name of the group. May refer to a group that only exists remotely.
    pub group: String,
    pub role: GroupRole,
}

/// Permission level of a group member, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupRole {
    Owner,
    Maintainer,
    Developer,
    Reporter,
    Guest,
}

impl GroupRole {
    /// Spelling used in documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Maintainer => "maintainer",
            Self::Developer => "developer",
            Self::Reporter => "reporter",
            Self::Guest => "guest",
        }
    }

    /// Spelling of the platform's GraphQL enum.
    pub fn as_graphql(&self) -> &'static str {
        match self {
            Self::Owner => "OWNER",
            Self::Maintainer => "MAINTAINER",
            Self::Developer => "DEVELOPER",
            Self::Reporter => "REPORTER",
            Self::Guest => "GUEST",
        }
    }

    /// Parses either spelling, ignoring case.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "owner" => Some(Self::Owner),
            "maintainer" => Some(Self::Maintainer),
            "developer" => Some(Self::Developer),
            "reporter" => Some(Self::Reporter),
            "guest" => Some(Self::Guest),
            _ => None,
        }
    }
}

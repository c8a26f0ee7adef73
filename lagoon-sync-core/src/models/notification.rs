/// The kinds of notification channel the platform supports.
///
/// The declaration order is the order used everywhere a document lists kinds:
/// serialization, planning and export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NotificationKind {
    Slack,
    RocketChat,
    Email,
    MicrosoftTeams,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 4] = [
        NotificationKind::Slack,
        NotificationKind::RocketChat,
        NotificationKind::Email,
        NotificationKind::MicrosoftTeams,
    ];

    /// Key used for this kind in documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Slack => "slack",
            Self::RocketChat => "rocketchat",
            Self::Email => "email",
            Self::MicrosoftTeams => "microsoftteams",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "slack" => Some(Self::Slack),
            "rocketchat" => Some(Self::RocketChat),
            "email" => Some(Self::Email),
            "microsoftteams" => Some(Self::MicrosoftTeams),
            _ => None,
        }
    }

    /// Value of the platform's `NotificationType` enum.
    pub fn as_graphql(&self) -> &'static str {
        match self {
            Self::Slack => "SLACK",
            Self::RocketChat => "ROCKETCHAT",
            Self::Email => "EMAIL",
            Self::MicrosoftTeams => "MICROSOFTTEAMS",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notification channel, tagged by kind.
///
/// Slack and RocketChat share the webhook/channel shape; the other kinds carry
/// only what their platform integration needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationChannel {
    Slack {
        name: String,
        webhook: String,
        channel: String,
    },
    RocketChat {
        name: String,
        webhook: String,
        channel: String,
    },
    Email {
        name: String,
        email_address: String,
    },
    MicrosoftTeams {
        name: String,
        webhook: String,
    },
}

impl NotificationChannel {
    pub fn kind(&self) -> NotificationKind {
        match self {
            Self::Slack { .. } => NotificationKind::Slack,
            Self::RocketChat { .. } => NotificationKind::RocketChat,
            Self::Email { .. } => NotificationKind::Email,
            Self::MicrosoftTeams { .. } => NotificationKind::MicrosoftTeams,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Slack { name, .. }
            | Self::RocketChat { name, .. }
            | Self::Email { name, .. }
            | Self::MicrosoftTeams { name, .. } => name,
        }
    }
}

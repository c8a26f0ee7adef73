//! GraphQL documents, keyed by operation name.
//!
//! Mutation variables are flat; each document builds the nested input object
//! the API expects.

use serde_json::{Map, Value};

macro_rules! project_fields {
    () => {
        "fragment ProjectExport on Project {
  name
  gitUrl
  branches
  productionEnvironment
  openshift { id }
  notifications {
    __typename
    ... on NotificationSlack { name webhook channel }
    ... on NotificationRocketChat { name webhook channel }
    ... on NotificationEmail { name emailAddress }
    ... on NotificationMicrosoftTeams { name webhook }
  }
  groups {
    name
    ... on Group {
      members {
        role
        user { email sshKeys { name keyType keyValue } }
      }
    }
  }
}
"
    };
}

pub const ALL_PROJECTS: &str = concat!(
    "query allProjects {
  allProjects { ...ProjectExport }
}
",
    project_fields!()
);

pub const PROJECT_BY_NAME: &str = concat!(
    "query projectByName($name: String!) {
  projectByName(name: $name) { ...ProjectExport }
}
",
    project_fields!()
);

pub const ADD_GROUP: &str = "mutation addGroup($name: String!) {
  addGroup(input: { name: $name }) { id name }
}";

/// Adds the user and, when `$withSshKey` is set, their key in the same request.
/// See [`prepare_variables`] for how the key line is split.
pub const ADD_USER: &str = "mutation addUser(
  $email: String!
  $withSshKey: Boolean!
  $keyName: String = \"\"
  $keyType: SshKeyType = SSH_RSA
  $keyValue: String = \"\"
) {
  addUser(input: { email: $email }) { id email }
  addSshKey(input: {
    name: $keyName
    keyType: $keyType
    keyValue: $keyValue
    user: { email: $email }
  }) @include(if: $withSshKey) { id }
}";

pub const ADD_USER_TO_GROUP: &str =
    "mutation addUserToGroup($email: String!, $group: String!, $role: GroupRole!) {
  addUserToGroup(input: { user: { email: $email }, group: { name: $group }, role: $role }) { id name }
}";

pub const ADD_NOTIFICATION_SLACK: &str =
    "mutation addNotificationSlack($name: String!, $webhook: String!, $channel: String!) {
  addNotificationSlack(input: { name: $name, webhook: $webhook, channel: $channel }) { id }
}";

pub const ADD_NOTIFICATION_ROCKETCHAT: &str =
    "mutation addNotificationRocketChat($name: String!, $webhook: String!, $channel: String!) {
  addNotificationRocketChat(input: { name: $name, webhook: $webhook, channel: $channel }) { id }
}";

pub const ADD_NOTIFICATION_EMAIL: &str =
    "mutation addNotificationEmail($name: String!, $emailAddress: String!) {
  addNotificationEmail(input: { name: $name, emailAddress: $emailAddress }) { id }
}";

pub const ADD_NOTIFICATION_MICROSOFTTEAMS: &str =
    "mutation addNotificationMicrosoftTeams($name: String!, $webhook: String!) {
  addNotificationMicrosoftTeams(input: { name: $name, webhook: $webhook }) { id }
}";

pub const ADD_PROJECT: &str = "mutation addProject(
  $name: String!
  $gitUrl: String!
  $openshift: Int
  $branches: String
  $productionEnvironment: String
) {
  addProject(input: {
    name: $name
    gitUrl: $gitUrl
    openshift: $openshift
    branches: $branches
    productionEnvironment: $productionEnvironment
  }) { id name }
}";

pub const ADD_GROUPS_TO_PROJECT: &str =
    "mutation addGroupsToProject($project: String!, $group: String!) {
  addGroupsToProject(input: { project: { name: $project }, groups: [{ name: $group }] }) { id }
}";

pub const ADD_NOTIFICATION_TO_PROJECT: &str = "mutation addNotificationToProject(
  $project: String!
  $notificationType: NotificationType!
  $notificationName: String!
) {
  addNotificationToProject(input: {
    project: $project
    notificationType: $notificationType
    notificationName: $notificationName
  }) { id }
}";

/// Reshape flat operation variables into what the stored document declares.
///
/// `addUser` carries the key as one `sshKey` line (`<type> <value> [name]`);
/// the document wants it split, with the key named after its comment or, failing
/// that, the user's email.
pub fn prepare_variables(operation: &str, mut variables: Map<String, Value>) -> Map<String, Value> {
    if operation != "addUser" {
        return variables;
    }

    let line = match variables.remove("sshKey") {
        Some(Value::String(line)) if !line.trim().is_empty() => line,
        _ => {
            variables.insert("withSshKey".into(), Value::Bool(false));
            return variables;
        }
    };

    let mut parts = line.split_whitespace();
    let (key_type, key_value) = match (parts.next(), parts.next()) {
        (Some(key_type), Some(key_value)) => (
            key_type.to_ascii_uppercase().replace('-', "_"),
            key_value.to_string(),
        ),
        _ => ("SSH_RSA".to_string(), line.trim().to_string()),
    };
    let comment = parts.collect::<Vec<_>>().join(" ");
    let key_name = if comment.is_empty() {
        variables
            .get("email")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    } else {
        comment
    };

    variables.insert("withSshKey".into(), Value::Bool(true));
    variables.insert("keyType".into(), Value::String(key_type));
    variables.insert("keyValue".into(), Value::String(key_value));
    variables.insert("keyName".into(), Value::String(key_name));
    variables
}

/// Look up the document for an operation name.
pub fn document(operation: &str) -> Option<&'static str> {
    let doc = match operation {
        "allProjects" => ALL_PROJECTS,
        "projectByName" => PROJECT_BY_NAME,
        "addGroup" => ADD_GROUP,
        "addUser" => ADD_USER,
        "addUserToGroup" => ADD_USER_TO_GROUP,
        "addNotificationSlack" => ADD_NOTIFICATION_SLACK,
        "addNotificationRocketChat" => ADD_NOTIFICATION_ROCKETCHAT,
        "addNotificationEmail" => ADD_NOTIFICATION_EMAIL,
        "addNotificationMicrosoftTeams" => ADD_NOTIFICATION_MICROSOFTTEAMS,
        "addProject" => ADD_PROJECT,
        "addGroupsToProject" => ADD_GROUPS_TO_PROJECT,
        "addNotificationToProject" => ADD_NOTIFICATION_TO_PROJECT,
        _ => return None,
    };
    Some(doc)
}

use chrono::{DateTime, SecondsFormat, Utc};
use lagoon_sync_core::{parser, translate, Document, RequestExecutor, SkipExport, Snapshot};
use serde_json::{Map, Value};

use crate::error::{CliError, Result};
use crate::prompt::Confirmer;

#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Export one project instead of all of them.
    pub project: Option<String>,
    pub skip: SkipExport,
    pub force: bool,
    pub interactive: bool,
}

pub fn confirm_message(project: Option<&str>) -> String {
    match project {
        Some(name) => format!("Are you sure you want to export lagoon output for {}?", name),
        None => "Are you sure you want to export lagoon output for all projects?".to_string(),
    }
}

/// Query the platform for one project, or for all of them.
pub async fn fetch_snapshot<E: RequestExecutor>(
    executor: &E,
    project: Option<&str>,
) -> Result<Snapshot> {
    let (operation, variables) = match project {
        Some(name) => {
            let mut variables = Map::new();
            variables.insert("name".into(), Value::String(name.to_string()));
            ("projectByName", variables)
        }
        None => ("allProjects", Map::new()),
    };

    let data = executor
        .execute(operation, variables)
        .await
        .map_err(|e| CliError::Remote(e.to_string()))?;
    let snapshot = Snapshot::from_value(data)?;

    if let Some(name) = project {
        if snapshot.projects.is_empty() {
            return Err(CliError::ProjectNotFound(name.to_string()));
        }
    }
    tracing::debug!(projects = snapshot.projects.len(), "fetched snapshot");
    Ok(snapshot)
}

/// Document YAML behind a generation timestamp.
pub fn render(document: &Document, generated_at: DateTime<Utc>) -> Result<String> {
    let yaml = parser::serialize(document)?;
    Ok(format!(
        "# Generated at: {}\n{}",
        generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        yaml
    ))
}

/// Fetch, translate and render. `None` when the operator declined.
pub async fn run<E: RequestExecutor>(
    options: &ExportOptions,
    executor: &E,
    confirmer: &dyn Confirmer,
) -> Result<Option<String>> {
    let project = options.project.as_deref();
    if options.interactive && !options.force && !confirmer.confirm(&confirm_message(project))? {
        return Ok(None);
    }

    let snapshot = fetch_snapshot(executor, project).await?;
    let document = translate(&snapshot, &options.skip)?;
    tracing::info!(
        groups = document.groups.len(),
        users = document.users.len(),
        notifications = document.notifications.len(),
        projects = document.projects.len(),
        "exported"
    );
    render(&document, Utc::now()).map(Some)
}

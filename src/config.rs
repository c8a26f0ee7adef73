use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CliError;

const CONFIG_FILE: &str = ".lagoon.yml";

pub const DEFAULT_CONTEXT: &str = "amazeeio";
pub const DEFAULT_GRAPHQL: &str = "https://api.lagoon.amazeeio.cloud/graphql";

pub const ENV_GRAPHQL_URL: &str = "LAGOON_GRAPHQL_URL";
pub const ENV_TOKEN: &str = "LAGOON_TOKEN";

/// Contents of `~/.lagoon.yml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Context used when `--lagoon` is not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<String>,
    #[serde(default)]
    pub lagoons: BTreeMap<String, LagoonContext>,
}

/// One named Lagoon endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LagoonContext {
    pub graphql: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Values read from the environment that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub graphql: Option<String>,
    pub token: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        let read = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        Self {
            graphql: read(ENV_GRAPHQL_URL),
            token: read(ENV_TOKEN),
        }
    }
}

/// The endpoint a command actually talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedContext {
    pub name: String,
    pub graphql: String,
    pub token: Option<String>,
}

impl Config {
    /// Load configuration from `path`, or from the home directory.
    /// A missing file yields the default configuration.
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => match default_path() {
                Some(path) => path,
                None => {
                    tracing::debug!("no home directory, using default configuration");
                    return Ok(Self::default());
                }
            },
        };

        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|source| CliError::ReadFile {
            path: config_path.clone(),
            source,
        })?;
        Self::from_yaml(&content)
            .map_err(|e| CliError::Config(format!("{}: {}", config_path.display(), e)))
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Pick a context by explicit name, then `current`, then the first
    /// configured one, then the built-in default.
    pub fn resolve(
        &self,
        name: Option<&str>,
        env: &EnvOverrides,
    ) -> Result<ResolvedContext, CliError> {
        let selected = name
            .map(str::to_string)
            .or_else(|| self.current.clone())
            .or_else(|| self.lagoons.keys().next().cloned())
            .unwrap_or_else(|| DEFAULT_CONTEXT.to_string());

        let mut resolved = match self.lagoons.get(&selected) {
            Some(ctx) => ResolvedContext {
                name: selected,
                graphql: ctx.graphql.clone(),
                token: ctx.token.clone(),
            },
            None if selected == DEFAULT_CONTEXT => ResolvedContext {
                name: selected,
                graphql: DEFAULT_GRAPHQL.to_string(),
                token: None,
            },
            None => {
                return Err(CliError::Config(format!(
                    "lagoon '{}' is not defined in the configuration",
                    selected
                )))
            }
        };

        if let Some(ref graphql) = env.graphql {
            resolved.graphql = graphql.clone();
        }
        if let Some(ref token) = env.token {
            resolved.token = Some(token.clone());
        }
        Ok(resolved)
    }
}

pub fn default_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_FILE))
}

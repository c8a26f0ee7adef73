//! GraphQL client for the Lagoon API.
//!
//! This is the concrete [`RequestExecutor`]: every named operation maps to a
//! stored GraphQL document (see [`queries`]) that is posted together with the
//! operation's variables.

pub mod queries;

use std::path::Path;

use async_trait::async_trait;
use lagoon_sync_core::RequestExecutor;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::{Config, EnvOverrides, ResolvedContext};
use crate::error::CliError;

/// HTTP and GraphQL errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: token missing, invalid or expired")]
    Unauthorized,

    #[error("Server error: {0}")]
    Server(String),

    #[error("{0}")]
    Graphql(String),

    #[error("No GraphQL document for operation '{0}'")]
    UnknownOperation(String),
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphqlErrorMessage>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorMessage {
    message: String,
}

/// Posts GraphQL documents to one Lagoon endpoint.
#[derive(Debug, Clone)]
pub struct GraphqlClient {
    endpoint: String,
    token: Option<String>,
    client: Client,
}

impl GraphqlClient {
    pub fn new(endpoint: impl Into<String>, token: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token,
            client: Client::new(),
        }
    }

    pub fn from_context(context: &ResolvedContext) -> Self {
        Self::new(context.graphql.clone(), context.token.clone())
    }

    /// Load the config file, pick a context and build a client for it.
    pub fn connect(config: Option<&Path>, lagoon: Option<&str>) -> Result<Self, CliError> {
        let config = Config::load(config)?;
        let context = config.resolve(lagoon, &EnvOverrides::from_env())?;
        tracing::debug!(lagoon = %context.name, endpoint = %context.graphql, "using lagoon");
        Ok(Self::from_context(&context))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build a request with user agent and optional auth header.
    fn request(&self) -> reqwest::RequestBuilder {
        let mut req = self.client.post(&self.endpoint).header(
            reqwest::header::USER_AGENT,
            format!("lagoon-sync version: {}", env!("CARGO_PKG_VERSION")),
        );
        if let Some(ref token) = self.token {
            req = req.bearer_auth(token);
        }
        req
    }

    /// Handle response, converting HTTP and GraphQL errors to ClientError.
    async fn handle_response(&self, response: reqwest::Response) -> Result<Value, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return match status {
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(body)),
                StatusCode::BAD_REQUEST => Err(ClientError::BadRequest(body)),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ClientError::Unauthorized),
                _ => Err(ClientError::Server(format!("{}: {}", status, body))),
            };
        }

        let body: GraphqlResponse = response.json().await?;
        if let Some(errors) = body.errors.filter(|e| !e.is_empty()) {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            return Err(ClientError::Graphql(messages.join("; ")));
        }
        Ok(body.data.unwrap_or(Value::Null))
    }

    /// Run the stored document for `operation` and return its `data` member.
    pub async fn query(
        &self,
        operation: &str,
        variables: Map<String, Value>,
    ) -> Result<Value, ClientError> {
        let document = queries::document(operation)
            .ok_or_else(|| ClientError::UnknownOperation(operation.to_string()))?;

        let variables = queries::prepare_variables(operation, variables);

        tracing::debug!(operation, endpoint = %self.endpoint, "sending GraphQL request");
        let response = self
            .request()
            .json(&serde_json::json!({
                "query": document,
                "operationName": operation,
                "variables": variables,
            }))
            .send()
            .await?;

        let data = self.handle_response(response).await?;
        tracing::debug!(operation, response = %data, "GraphQL response");
        Ok(data)
    }
}

#[async_trait]
impl RequestExecutor for GraphqlClient {
    type Error = ClientError;

    async fn execute(
        &self,
        operation: &str,
        variables: Map<String, Value>,
    ) -> Result<Value, ClientError> {
        self.query(operation, variables).await
    }
}

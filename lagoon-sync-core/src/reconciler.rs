//! Applies a plan against the platform, one operation at a time.
//!
//! Operations run strictly in plan order because later ones rely on what
//! earlier ones created. A failure either stops the run or is recorded and the
//! run moves on, depending on the [`FailurePolicy`]. An operation whose
//! dependency failed is still attempted: the platform may already hold that
//! entity from an earlier import.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

use crate::error::ApplyError;
use crate::planner::{EntityRef, Operation, OperationKind};

/// Issues a single named remote procedure.
///
/// Transport concerns (connections, TLS, retries, timeouts) belong to the
/// implementation, not to the reconciler.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn execute(
        &self,
        operation: &str,
        variables: Map<String, Value>,
    ) -> Result<Value, Self::Error>;
}

#[async_trait]
impl<E: RequestExecutor + ?Sized> RequestExecutor for &E {
    type Error = E::Error;

    async fn execute(
        &self,
        operation: &str,
        variables: Map<String, Value>,
    ) -> Result<Value, Self::Error> {
        (**self).execute(operation, variables).await
    }
}

/// What to do when an operation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first failure.
    AbortOnFirstError,
    /// Record the failure and carry on with the next operation.
    ContinueCollectingErrors,
}

/// An operation the platform rejected (or that could not be sent).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedOperation {
    /// Position in the plan.
    pub index: usize,
    pub kind: OperationKind,
    pub description: String,
    pub error: ApplyError,
}

/// Outcome of a run. Always complete: nothing is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyResult {
    pub applied: usize,
    pub failed: Vec<FailedOperation>,
    /// Operations never issued because the run was aborted or cancelled.
    pub not_attempted: usize,
    pub cancelled: bool,
}

impl ApplyResult {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.not_attempted == 0
    }
}

/// Encodes a payload as a flat variable map.
///
/// Round-tripping through [`serde_json::Value`] drops unset optional fields
/// instead of sending them as `null`.
pub fn to_variables<T: Serialize>(payload: &T) -> Result<Map<String, Value>, ApplyError> {
    match serde_json::to_value(payload) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ApplyError::InvalidPayload(format!(
            "expected an object, got {other}"
        ))),
        Err(e) => Err(ApplyError::InvalidPayload(e.to_string())),
    }
}

/// Walks a plan and applies it through a [`RequestExecutor`].
pub struct Reconciler<E> {
    executor: E,
    cancel: CancellationToken,
}

impl<E: RequestExecutor> Reconciler<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            cancel: CancellationToken::new(),
        }
    }

    /// Uses `token` to stop the run between operations.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub async fn apply(&self, plan: &[Operation], policy: FailurePolicy) -> ApplyResult {
        let mut result = ApplyResult::default();
        let mut failed_entities: HashSet<&EntityRef> = HashSet::new();

        for (index, operation) in plan.iter().enumerate() {
            if self.cancel.is_cancelled() {
                tracing::warn!(remaining = plan.len() - index, "import cancelled");
                result.cancelled = true;
                result.not_attempted = plan.len() - index;
                break;
            }

            match self.apply_one(operation).await {
                Ok(()) => {
                    tracing::info!(operation = %operation.description, "applied");
                    result.applied += 1;
                }
                Err(failure) => {
                    let error = classify(operation, &failed_entities, failure);
                    tracing::warn!(operation = %operation.description, error = %error, "failed");
                    if let Some(entity) = &operation.creates {
                        failed_entities.insert(entity);
                    }
                    result.failed.push(FailedOperation {
                        index,
                        kind: operation.kind,
                        description: operation.description.clone(),
                        error,
                    });

                    if policy == FailurePolicy::AbortOnFirstError {
                        result.not_attempted = plan.len() - index - 1;
                        break;
                    }
                }
            }
        }

        result
    }

    async fn apply_one(&self, operation: &Operation) -> Result<(), Failure> {
        let variables = to_variables(&operation.payload).map_err(Failure::Payload)?;
        let logged = serde_json::Value::Object(variables.clone());
        tracing::debug!(
            procedure = operation.kind.procedure(),
            variables = %logged,
            "executing"
        );
        self.executor
            .execute(operation.kind.procedure(), variables)
            .await
            .map(|_| ())
            .map_err(|e| Failure::Remote(e.to_string()))
    }
}

enum Failure {
    Payload(ApplyError),
    Remote(String),
}

const MISSING_ENTITY_HINTS: [&str; 4] = [
    "not found",
    "does not exist",
    "doesn't exist",
    "no data returned",
];

/// Separates "something this operation needs is missing" from other remote
/// errors, for reporting only.
fn classify(operation: &Operation, failed: &HashSet<&EntityRef>, failure: Failure) -> ApplyError {
    let message = match failure {
        Failure::Payload(err) => return err,
        Failure::Remote(message) => message,
    };

    if operation.requires.is_empty() {
        return ApplyError::RemoteOperationFailed { message };
    }

    let broken: Vec<String> = operation
        .requires
        .iter()
        .filter(|entity| failed.contains(entity))
        .map(|entity| entity.to_string())
        .collect();
    if !broken.is_empty() {
        return ApplyError::DependencyUnresolved {
            references: broken,
            message,
        };
    }

    let lower = message.to_lowercase();
    if MISSING_ENTITY_HINTS.iter().any(|hint| lower.contains(hint)) {
        return ApplyError::DependencyUnresolved {
            references: operation.requires.iter().map(|e| e.to_string()).collect(),
            message,
        };
    }

    ApplyError::RemoteOperationFailed { message }
}

#![allow(dead_code)]

use std::sync::Mutex;

use lagoon_sync::prompt::Confirmer;
use lagoon_sync_core::{async_trait, RequestExecutor};
use serde_json::{json, Map, Value};
use tokio_util::sync::CancellationToken;

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct FakeError(pub String);

struct FailureRule {
    operation: String,
    /// Variable that must match, or `None` to fail every call.
    matching: Option<(String, String)>,
    message: String,
}

/// Records every call and answers from canned rules.
#[derive(Default)]
pub struct RecordingExecutor {
    calls: Mutex<Vec<(String, Map<String, Value>)>>,
    failures: Vec<FailureRule>,
    responses: Vec<(String, Value)>,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail `operation` calls whose variable `key` equals `value`.
    pub fn failing(mut self, operation: &str, key: &str, value: &str, message: &str) -> Self {
        self.failures.push(FailureRule {
            operation: operation.into(),
            matching: Some((key.into(), value.into())),
            message: message.into(),
        });
        self
    }

    /// Fail every `operation` call.
    pub fn rejecting(mut self, operation: &str, message: &str) -> Self {
        self.failures.push(FailureRule {
            operation: operation.into(),
            matching: None,
            message: message.into(),
        });
        self
    }

    pub fn responding(mut self, operation: &str, data: Value) -> Self {
        self.responses.push((operation.into(), data));
        self
    }

    /// Cancel `token` once `calls` calls have been made.
    pub fn cancelling_after(mut self, calls: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((calls, token));
        self
    }

    pub fn calls(&self) -> Vec<(String, Map<String, Value>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn operations(&self) -> Vec<String> {
        self.calls().into_iter().map(|(op, _)| op).collect()
    }
}

#[async_trait]
impl RequestExecutor for RecordingExecutor {
    type Error = FakeError;

    async fn execute(
        &self,
        operation: &str,
        variables: Map<String, Value>,
    ) -> Result<Value, FakeError> {
        let count = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((operation.to_string(), variables.clone()));
            calls.len()
        };
        if let Some((after, token)) = &self.cancel_after {
            if count >= *after {
                token.cancel();
            }
        }

        for rule in &self.failures {
            let matches = match &rule.matching {
                Some((key, value)) => {
                    variables.get(key).and_then(Value::as_str) == Some(value.as_str())
                }
                None => true,
            };
            if rule.operation == operation && matches {
                return Err(FakeError(rule.message.clone()));
            }
        }

        let data = self
            .responses
            .iter()
            .find(|(op, _)| op == operation)
            .map(|(_, data)| data.clone())
            .unwrap_or_else(|| json!({ operation: { "id": 1 } }));
        Ok(data)
    }
}

/// Answers every question the same way and remembers what was asked.
pub struct RecordingConfirmer {
    answer: bool,
    asked: Mutex<Vec<String>>,
}

impl RecordingConfirmer {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

impl Confirmer for RecordingConfirmer {
    fn confirm(&self, message: &str) -> lagoon_sync::Result<bool> {
        self.asked.lock().unwrap().push(message.to_string());
        Ok(self.answer)
    }
}

/// Two projects sharing the group `example-com`, as returned by `allProjects`.
pub fn all_projects_snapshot() -> Value {
    json!({
        "data": {
            "allProjects": [
                {
                    "name": "example-com",
                    "gitUrl": "git@github.com:example/example-com.git",
                    "branches": "master|develop",
                    "productionEnvironment": "master",
                    "openshift": { "id": 1 },
                    "notifications": [
                        {
                            "__typename": "NotificationSlack",
                            "name": "example-com-slack",
                            "webhook": "https://slack.com/webhook",
                            "channel": "example-com"
                        },
                        {
                            "__typename": "NotificationRocketChat",
                            "name": "example-com-rocketchat",
                            "webhook": "https://rocketchat.com/webhook",
                            "channel": "example-com"
                        }
                    ],
                    "groups": [
                        {
                            "name": "project-example-com",
                            "members": [
                                {
                                    "role": "MAINTAINER",
                                    "user": { "email": "default-user@example-com", "sshKeys": [] }
                                }
                            ]
                        },
                        {
                            "name": "example-com",
                            "members": [
                                {
                                    "role": "OWNER",
                                    "user": {
                                        "email": "usera@example.com",
                                        "sshKeys": [
                                            {
                                                "name": "usera@macbook.local",
                                                "keyType": "SSH_ED25519",
                                                "keyValue": "AAAAC3NzaC1lZDI1NTE5AAAAIG"
                                            }
                                        ]
                                    }
                                }
                            ]
                        }
                    ]
                },
                {
                    "name": "example-com-api",
                    "gitUrl": "git@github.com:example/example-com-api.git",
                    "branches": null,
                    "productionEnvironment": "main",
                    "openshift": { "id": 1 },
                    "notifications": [
                        {
                            "__typename": "NotificationRocketChat",
                            "name": "example-com-rocketchat",
                            "webhook": "https://rocketchat.com/webhook",
                            "channel": "example-com"
                        }
                    ],
                    "groups": [
                        {
                            "name": "example-com",
                            "members": [
                                {
                                    "role": "OWNER",
                                    "user": { "email": "usera@example.com", "sshKeys": [] }
                                }
                            ]
                        }
                    ]
                }
            ]
        }
    })
}

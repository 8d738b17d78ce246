use serde::{Deserialize, Serialize};

use crate::webhook::PushEvent;

/// Context label the host shows next to each status entry
pub const STACK_CONTEXT: &str = "stack-deploy";

const SCM_PROVIDER: &str = "gitlab";

/// Represents the state of a stack deploy as reported to the host
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Pending,
    Success,
    Failure,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommitStatus {
    pub status: StatusKind,
    pub description: String,
    pub context: String,
}

/// Push details the status function needs to locate the commit
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EventInfo {
    pub service: String,
    pub owner: String,
    pub repository: String,
    pub sha: String,
    pub url: String,
    pub scm_provider: String,
}

impl From<&PushEvent> for EventInfo {
    fn from(event: &PushEvent) -> Self {
        Self {
            service: event.repository.name.clone(),
            owner: event.repository.owner.login.clone(),
            repository: event.repository.name.clone(),
            sha: event.after_commit_id.clone(),
            url: event.repository.clone_url.clone(),
            scm_provider: SCM_PROVIDER.to_string(),
        }
    }
}

/// Ordered status entries for one invocation. Entries are only ever appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusReport {
    #[serde(rename = "commit-statuses")]
    statuses: Vec<CommitStatus>,
    #[serde(rename = "event")]
    pub event_info: EventInfo,
    #[serde(rename = "auth-token", default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

impl StatusReport {
    pub fn new(event: &PushEvent, auth_token: Option<String>) -> Self {
        Self {
            statuses: Vec::new(),
            event_info: EventInfo::from(event),
            auth_token,
        }
    }

    pub fn add_status(&mut self, status: StatusKind, description: impl Into<String>) {
        self.statuses.push(CommitStatus {
            status,
            description: description.into(),
            context: STACK_CONTEXT.to_string(),
        });
    }

    pub fn statuses(&self) -> &[CommitStatus] {
        &self.statuses
    }

    /// Most recently appended entry
    pub fn latest(&self) -> Option<&CommitStatus> {
        self.statuses.last()
    }
}

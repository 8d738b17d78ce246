//! Webhook related structures

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Value of the `X-Gitlab-Event` header for a push
pub const PUSH_EVENT_HINT: &str = "Push Hook";

/// Fields read from a GitLab push webhook payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GitLabPushEvent {
    pub git_ref: String,
    pub user_username: String,
    pub user_email: String,
    pub project_name: String,
    pub path_with_namespace: String,
    pub git_http_url: String,
    pub after: String,
}

impl GitLabPushEvent {
    /// Lenient decode: a field that is missing, null or not a string becomes
    /// an empty string. A body that is not JSON yields an all-empty event.
    /// Invalid UTF-8 is replaced with U+FFFD. This never fails.
    pub fn decode_lenient(body: &[u8]) -> Self {
        let text = String::from_utf8_lossy(body);
        let payload: Value = match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(e) => {
                debug!("Could not parse JSON body, continuing with empty fields: {:?}", e);
                Value::Null
            }
        };
        Self::from_value(&payload)
    }

    fn from_value(payload: &Value) -> Self {
        Self {
            git_ref: str_at(payload, &["ref"]),
            user_username: str_at(payload, &["user_username"]),
            user_email: str_at(payload, &["user_email"]),
            project_name: str_at(payload, &["project", "name"]),
            path_with_namespace: str_at(payload, &["project", "path_with_namespace"]),
            git_http_url: str_at(payload, &["repository", "git_http_url"]),
            after: str_at(payload, &["after"]),
        }
    }
}

/// String at a nested key path, or empty
fn str_at(payload: &Value, path: &[&str]) -> String {
    path.iter()
        .try_fold(payload, |v, key| v.get(*key))
        .and_then(|v| v.as_str())
        .map(String::from)
        .unwrap_or_default()
}

/// Provider-neutral push event posted to the build gateway
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushEvent {
    #[serde(rename = "ref", default)]
    pub git_ref: String,
    #[serde(default)]
    pub repository: Repository,
    #[serde(rename = "after", default)]
    pub after_commit_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub clone_url: String,
    #[serde(default)]
    pub owner: Owner,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub email: String,
}

impl PushEvent {
    /// Label used in status messages, `{owner}-{repository}`
    pub fn service_identifier(&self) -> String {
        format!("{}-{}", self.repository.owner.login, self.repository.name)
    }
}

impl From<GitLabPushEvent> for PushEvent {
    fn from(raw: GitLabPushEvent) -> Self {
        Self {
            git_ref: raw.git_ref,
            repository: Repository {
                name: raw.project_name,
                full_name: raw.path_with_namespace,
                clone_url: raw.git_http_url,
                owner: Owner {
                    login: raw.user_username,
                    email: raw.user_email,
                },
            },
            after_commit_id: raw.after,
        }
    }
}

impl fmt::Display for PushEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ref: {}, repository: {} ({}), owner: {} <{}>, after: {}}}",
            self.git_ref,
            self.repository.full_name,
            self.repository.clone_url,
            self.repository.owner.login,
            self.repository.owner.email,
            self.after_commit_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_payload() -> Vec<u8> {
        json!({
            "object_kind": "push",
            "ref": "refs/heads/main",
            "after": "da1560886d4f094c3e6c9ef40349f7d38b5d27d7",
            "user_username": "alice",
            "user_email": "alice@example.com",
            "project": {
                "name": "repo1",
                "path_with_namespace": "alice/repo1"
            },
            "repository": {
                "name": "repo1",
                "git_http_url": "https://gitlab.example.com/alice/repo1.git"
            }
        })
        .to_string()
        .into_bytes()
    }

    #[test]
    fn maps_gitlab_fields_onto_push_event() {
        let event = PushEvent::from(GitLabPushEvent::decode_lenient(&sample_payload()));

        assert_eq!(event.git_ref, "refs/heads/main");
        assert_eq!(event.repository.name, "repo1");
        assert_eq!(event.repository.full_name, "alice/repo1");
        assert_eq!(
            event.repository.clone_url,
            "https://gitlab.example.com/alice/repo1.git"
        );
        assert_eq!(event.repository.owner.login, "alice");
        assert_eq!(event.repository.owner.email, "alice@example.com");
        assert_eq!(
            event.after_commit_id,
            "da1560886d4f094c3e6c9ef40349f7d38b5d27d7"
        );
    }

    #[test]
    fn service_identifier_joins_owner_and_name() {
        let event = PushEvent::from(GitLabPushEvent::decode_lenient(&sample_payload()));
        assert_eq!(event.service_identifier(), "alice-repo1");
    }

    #[test]
    fn missing_after_becomes_empty() {
        let body = json!({"ref": "refs/heads/dev", "user_username": "bob"}).to_string();
        let raw = GitLabPushEvent::decode_lenient(body.as_bytes());

        assert_eq!(raw.after, "");
        assert_eq!(raw.git_ref, "refs/heads/dev");
        assert_eq!(raw.project_name, "");
    }

    #[test]
    fn wrong_types_and_nulls_become_empty() {
        let body = json!({
            "ref": 42,
            "after": null,
            "project": "not-an-object",
            "user_username": "carol"
        })
        .to_string();
        let raw = GitLabPushEvent::decode_lenient(body.as_bytes());

        assert_eq!(raw.git_ref, "");
        assert_eq!(raw.after, "");
        assert_eq!(raw.project_name, "");
        assert_eq!(raw.user_username, "carol");
    }

    #[test]
    fn non_json_body_yields_empty_event() {
        let raw = GitLabPushEvent::decode_lenient(b"<html>definitely not json");
        assert_eq!(raw, GitLabPushEvent::default());

        let event = PushEvent::from(raw);
        assert_eq!(event.service_identifier(), "-");
    }

    #[test]
    fn invalid_utf8_only_affects_its_own_field() {
        let mut body = br#"{"ref":"refs/heads/main","user_username":"alice","user_email":"a"#.to_vec();
        body.push(0xff);
        body.extend_from_slice(br#"@x.com","after":"abc123"}"#);

        let raw = GitLabPushEvent::decode_lenient(&body);
        assert_eq!(raw.git_ref, "refs/heads/main");
        assert_eq!(raw.user_username, "alice");
        assert_eq!(raw.user_email, "a\u{fffd}@x.com");
        assert_eq!(raw.after, "abc123");
    }

    #[test]
    fn push_event_survives_json_round_trip() {
        let cases = [
            ("", "", "", "", "", "", ""),
            (
                "refs/heads/main",
                "repo1",
                "alice/repo1",
                "https://gitlab.example.com/alice/repo1.git",
                "alice",
                "alice@example.com",
                "da1560886d4f094c3e6c9ef40349f7d38b5d27d7",
            ),
            (
                "refs/tags/v1.0-\u{1F680}",
                "dépôt",
                "zoë/dépôt",
                "https://gitlab.example.com/zo%C3%AB/d%C3%A9p%C3%B4t.git",
                "zoë",
                "zoë@exämple.com",
                "abc",
            ),
            (
                "refs/heads/\"quoted\"",
                "back\\slash",
                "ns/tab\tand\nnewline",
                "file:///c:\\repos\\x",
                "o'neil",
                "\u{7f}ctrl@example.com",
                "\u{0}",
            ),
        ];

        for (git_ref, name, full_name, clone_url, login, email, after) in cases {
            let event = PushEvent {
                git_ref: git_ref.to_string(),
                repository: Repository {
                    name: name.to_string(),
                    full_name: full_name.to_string(),
                    clone_url: clone_url.to_string(),
                    owner: Owner {
                        login: login.to_string(),
                        email: email.to_string(),
                    },
                },
                after_commit_id: after.to_string(),
            };

            let encoded = serde_json::to_string(&event).unwrap();
            let decoded: PushEvent = serde_json::from_str(&encoded).unwrap();
            assert_eq!(decoded, event, "{encoded}");
            assert_eq!(serde_json::to_string(&decoded).unwrap(), encoded);
        }
    }

    #[test]
    fn push_event_uses_gateway_field_names() {
        let event = PushEvent::from(GitLabPushEvent::decode_lenient(&sample_payload()));
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["ref"], "refs/heads/main");
        assert_eq!(value["after"], "da1560886d4f094c3e6c9ef40349f7d38b5d27d7");
        assert_eq!(value["repository"]["full_name"], "alice/repo1");
        assert_eq!(value["repository"]["owner"]["login"], "alice");
    }
}

//! Status reporting back to the source-control host

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::debug;

use crate::error::{ForwarderError, Result};
use crate::status::StatusReport;
use crate::utils::{SIGNATURE_HEADER, gateway_endpoint, sign_payload};

/// Sends a status report to the host. Implementations decide the wire format;
/// callers only decide whether and when to report.
#[async_trait]
pub trait StatusReporter: Send + Sync {
    async fn report(&self, status: &StatusReport, gateway_url: &str) -> Result<String>;
}

/// Posts the report as JSON to `{gateway_url}/function/{status_function}`
#[derive(Debug, Clone)]
pub struct HttpStatusReporter {
    status_function: String,
    token: Option<String>,
    payload_secret: Option<String>,
}

impl HttpStatusReporter {
    pub fn new(status_function: impl Into<String>) -> Self {
        Self {
            status_function: status_function.into(),
            token: None,
            payload_secret: None,
        }
    }

    /// Sends `Authorization: Bearer <token>` with every report
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Signs every report body with this secret
    pub fn with_payload_secret(mut self, secret: Option<String>) -> Self {
        self.payload_secret = secret;
        self
    }
}

#[async_trait]
impl StatusReporter for HttpStatusReporter {
    async fn report(&self, status: &StatusReport, gateway_url: &str) -> Result<String> {
        let url = gateway_endpoint(gateway_url, &format!("function/{}", self.status_function));
        let body = serde_json::to_vec(status)?;

        let client = reqwest::Client::new();
        let mut request = client.post(&url).header(CONTENT_TYPE, "application/json");
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(secret) = &self.payload_secret {
            if let Some(signature) = sign_payload(secret, &body) {
                request = request.header(SIGNATURE_HEADER, signature);
            }
        }

        debug!("Reporting status to {}", url);
        let response = request.body(body).send().await?;
        let code = response.status();
        let text = response.text().await?;

        if !code.is_success() {
            return Err(ForwarderError::StatusRejected {
                code: code.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::status::StatusKind;
    use crate::webhook::PushEvent;

    fn pending_report(token: Option<String>) -> StatusReport {
        let mut report = StatusReport::new(&PushEvent::default(), token);
        report.add_status(StatusKind::Pending, "- stack deploy is in progress");
        report
    }

    #[tokio::test]
    async fn posts_report_to_status_function() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/function/gitlab-status"))
            .and(header("Content-Type", "application/json"))
            .and(header("Authorization", "Bearer tok"))
            .and(body_partial_json(serde_json::json!({
                "commit-statuses": [{"status": "pending", "context": "stack-deploy"}],
                "auth-token": "tok"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let reporter = HttpStatusReporter::new("gitlab-status").with_token(Some("tok".into()));
        let reply = reporter
            .report(&pending_report(Some("tok".into())), &mock_server.uri())
            .await
            .unwrap();
        assert_eq!(reply, "ok");
    }

    #[tokio::test]
    async fn signs_report_when_secret_is_set() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/function/gitlab-status"))
            .and(header_exists("X-Cloud-Signature"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let reporter =
            HttpStatusReporter::new("gitlab-status").with_payload_secret(Some("secret".into()));
        reporter
            .report(&pending_report(None), &format!("{}/", mock_server.uri()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn non_success_reply_is_an_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/function/gitlab-status"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
            .mount(&mock_server)
            .await;

        let reporter = HttpStatusReporter::new("gitlab-status");
        let err = reporter
            .report(&pending_report(None), &mock_server.uri())
            .await
            .unwrap_err();

        match err {
            ForwarderError::StatusRejected { code, body } => {
                assert_eq!(code, 401);
                assert_eq!(body, "bad token");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn empty_gateway_is_a_transport_error() {
        let reporter = HttpStatusReporter::new("gitlab-status");
        let err = reporter.report(&pending_report(None), "").await.unwrap_err();
        assert!(matches!(err, ForwarderError::Transport(_)));
    }
}

//! Translates GitLab push webhooks and forwards them to the build gateway

use std::sync::Arc;

use reqwest::StatusCode;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::ForwarderConfig;
use crate::error::Result;
use crate::reporter::{HttpStatusReporter, StatusReporter};
use crate::status::{StatusKind, StatusReport};
use crate::utils::gateway_endpoint;
use crate::webhook::{GitLabPushEvent, PUSH_EVENT_HINT, PushEvent};

/// Gateway path that starts a build from a push event
pub const GIT_TAR_PATH: &str = "async-function/git-tar";

/// Appended to transport errors when no gateway URL is configured
pub const NO_GATEWAY_URL: &str = "<no gateway_url configured>";

pub struct Forwarder {
    config: ForwarderConfig,
    reporter: Arc<dyn StatusReporter>,
}

impl Forwarder {
    /// Forwarder reporting status over HTTP through the gateway
    pub fn new(config: ForwarderConfig) -> Self {
        let reporter = HttpStatusReporter::new(config.status_function.clone())
            .with_token(config.status_token.clone())
            .with_payload_secret(config.payload_secret.clone());
        Self::with_reporter(config, Arc::new(reporter))
    }

    pub fn with_reporter(config: ForwarderConfig, reporter: Arc<dyn StatusReporter>) -> Self {
        Self { config, reporter }
    }

    pub fn config(&self) -> &ForwarderConfig {
        &self.config
    }

    /// Handles one webhook invocation. Every outcome, including failures,
    /// is described by the returned string.
    pub async fn handle(&self, body: &[u8], event_hint: &str) -> String {
        let span = info_span!("invocation", id = %Uuid::now_v7());
        self.handle_event(body, event_hint).instrument(span).await
    }

    async fn handle_event(&self, body: &[u8], event_hint: &str) -> String {
        if event_hint != PUSH_EVENT_HINT {
            warn!("Not a push event; received {:?}", event_hint);
            return format!(
                "Your request is: `{}` and event we support is `Push Event`",
                event_hint
            );
        }

        let event = PushEvent::from(GitLabPushEvent::decode_lenient(body));
        debug!("Decoded push event: {:?}", event);

        let service = event.service_identifier();
        let mut status = StatusReport::new(&event, self.config.status_token.clone());
        status.add_status(
            StatusKind::Pending,
            format!("{} stack deploy is in progress", service),
        );
        self.report_status(&status).await;

        match self.post_event(&event).await {
            Ok(code) => {
                info!(
                    "Forwarded push for '{}' at {}, git-tar status: {}",
                    service,
                    event.after_commit_id,
                    code.as_u16()
                );
                format!("Push - {}, git-tar status: {}\n", event, code.as_u16())
            }
            Err(e) => {
                error!("Failed to forward push for '{}': {}", service, e);
                status.add_status(StatusKind::Failure, e.to_string());
                self.report_status(&status).await;

                if self.config.has_gateway() {
                    format!("{} {}", e, self.config.gateway_url)
                } else {
                    format!("{} {}", e, NO_GATEWAY_URL)
                }
            }
        }
    }

    /// Any HTTP response counts as delivered; only transport errors fail.
    async fn post_event(&self, event: &PushEvent) -> Result<StatusCode> {
        let url = gateway_endpoint(&self.config.gateway_url, GIT_TAR_PATH);
        let client = reqwest::Client::new();
        let response = client.post(&url).json(event).send().await?;
        Ok(response.status())
    }

    async fn report_status(&self, status: &StatusReport) {
        if !self.config.report_status {
            return;
        }

        match self.reporter.report(status, &self.config.gateway_url).await {
            Ok(_) => debug!("Reported {:?} status", status.latest().map(|s| s.status)),
            Err(e) => warn!("Failed to report status, error: {}", e),
        }
    }
}

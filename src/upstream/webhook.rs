use chrono::Utc;
use serde_json::{Value, json};

use super::{UpstreamError, parse_body, send_for_text};
use crate::config::{ListMethod, WebhookConfig};

/// Client for the workflow engine's webhook endpoints.
#[derive(Clone)]
pub struct WebhookClient {
    http: reqwest::Client,
    config: WebhookConfig,
}

impl WebhookClient {
    pub fn new(http: reqwest::Client, config: WebhookConfig) -> Self {
        Self { http, config }
    }

    pub fn has_list(&self) -> bool {
        self.config.list_url.is_some()
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.auth {
            Some(auth) => request.header(auth.header.as_str(), auth.token.as_str()),
            None => request,
        }
    }

    fn list_request(&self, url: &str) -> reqwest::RequestBuilder {
        let request = match self.config.list_method {
            ListMethod::Get => self.http.get(url),
            ListMethod::Post => self.http.post(url).json(&json!({
                "action": "list_meetings",
                "requestedAt": Utc::now().to_rfc3339(),
            })),
        };
        self.authorize(request)
    }

    /// Pull the admin list. A 401/403 is retried once straight away: the
    /// workflow's own auth check can race a freshly issued credential.
    pub async fn fetch_list(&self) -> Result<Value, UpstreamError> {
        let url = self
            .config
            .list_url
            .as_deref()
            .ok_or(UpstreamError::NotConfigured("WEBHOOK_LIST_URL"))?;

        log::debug!("Fetching meeting list from workflow");
        let text = match send_for_text(self.list_request(url)).await {
            Err(e) if e.is_auth() => {
                log::warn!("Workflow list rejected credentials ({}), retrying once", e);
                send_for_text(self.list_request(url)).await?
            }
            other => other?,
        };
        Ok(parse_body(&text))
    }

    /// Forward a new public request to the intake workflow.
    pub async fn submit_request(&self, payload: &Value) -> Result<Value, UpstreamError> {
        let url = self
            .config
            .request_url
            .as_deref()
            .ok_or(UpstreamError::NotConfigured("WEBHOOK_REQUEST_URL"))?;
        self.post(url, payload).await
    }

    /// Forward an approve/reject/reschedule decision.
    pub async fn submit_action(&self, payload: &Value) -> Result<Value, UpstreamError> {
        let url = self
            .config
            .action_url
            .as_deref()
            .ok_or(UpstreamError::NotConfigured("WEBHOOK_ACTION_URL"))?;
        self.post(url, payload).await
    }

    async fn post(&self, url: &str, payload: &Value) -> Result<Value, UpstreamError> {
        log::debug!("POST workflow webhook {}", url);
        let text = send_for_text(self.authorize(self.http.post(url).json(payload))).await?;
        Ok(parse_body(&text))
    }
}

//! The meeting lifecycle gateway: owns the last fetched list and is the only
//! component that talks to the workflow engine or the spreadsheet.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::ingest::{self, Shape};
use crate::models::meeting::{
    ActionForm, MeetingRecord, NewMeetingRequest, Statistics, ValidatedAction, new_request_id,
};
use crate::upstream::{SheetClient, UpstreamError, WebhookClient, build_http_client};

/// Where a snapshot's records came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Webhook,
    Sheet,
}

/// One complete fetch result. Replaced as a whole, never mutated in place.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingSnapshot {
    pub meetings: Vec<MeetingRecord>,
    pub statistics: Statistics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl MeetingSnapshot {
    fn new(
        meetings: Vec<MeetingRecord>,
        external_stats: Option<&Value>,
        source: SourceKind,
        now: DateTime<Utc>,
    ) -> Self {
        let statistics = Statistics::reconcile(&meetings, external_stats, now);
        MeetingSnapshot {
            meetings,
            statistics,
            source: Some(source),
            fetched_at: Some(now),
            last_updated: None,
            message: None,
        }
    }
}

/// Result of `fetch`/`refresh`. `error` is set on a soft failure.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub snapshot: Arc<MeetingSnapshot>,
    pub error: Option<String>,
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionOutcome {
    pub success: bool,
    pub request_id: String,
    pub action: &'static str,
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOutcome {
    pub success: bool,
    pub request_id: String,
    pub message: String,
}

pub struct MeetingGateway {
    webhook: Option<WebhookClient>,
    sheet: Option<SheetClient>,
    current: RwLock<Arc<MeetingSnapshot>>,
}

impl MeetingGateway {
    pub fn new(webhook: Option<WebhookClient>, sheet: Option<SheetClient>) -> Self {
        Self {
            webhook,
            sheet,
            current: RwLock::new(Arc::new(MeetingSnapshot::default())),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, UpstreamError> {
        let http = build_http_client(config.upstream_timeout)?;
        let webhook = WebhookClient::new(http.clone(), config.webhook.clone());
        let sheet = SheetClient::new(http, config.sheet.clone());
        Ok(Self::new(Some(webhook), sheet.is_configured().then_some(sheet)))
    }

    /// The last successfully fetched list.
    pub fn current(&self) -> Arc<MeetingSnapshot> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn store(&self, snapshot: Arc<MeetingSnapshot>) {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        *current = snapshot;
    }

    /// Pull the list from the webhook, falling back to the spreadsheet.
    ///
    /// A successful result replaces the cached snapshot in one step, so with
    /// overlapping fetches the response that lands last wins. On total failure
    /// the outcome carries an empty list and the cache is left alone.
    pub async fn fetch(&self) -> FetchOutcome {
        let mut errors = Vec::new();

        if let Some(webhook) = self.webhook.as_ref().filter(|w| w.has_list()) {
            match webhook.fetch_list().await {
                Ok(payload) => {
                    let now = Utc::now();
                    let normalized = ingest::normalize_at(&payload, now);
                    if normalized.shape != Shape::Unmatched {
                        log::info!(
                            "Fetched {} meetings from workflow ({:?})",
                            normalized.records.len(),
                            normalized.shape
                        );
                        let mut snapshot = MeetingSnapshot::new(
                            normalized.records,
                            normalized.statistics.as_ref(),
                            SourceKind::Webhook,
                            now,
                        );
                        snapshot.last_updated = normalized.last_updated;
                        snapshot.message = normalized.message;
                        return self.publish(snapshot);
                    }
                    errors.push(
                        normalized
                            .message
                            .unwrap_or_else(|| "Workflow reply had no meeting records".to_string()),
                    );
                }
                Err(e) => {
                    log::warn!("Workflow list fetch failed: {}", e);
                    errors.push(format!("Workflow: {e}"));
                }
            }
        }

        if let Some(sheet) = &self.sheet {
            match sheet.fetch_table().await {
                Ok(table) => {
                    let now = Utc::now();
                    let records = ingest::decode_table_at(&table, now);
                    log::info!("Fetched {} meetings from spreadsheet", records.len());
                    let mut snapshot = MeetingSnapshot::new(records, None, SourceKind::Sheet, now);
                    if !errors.is_empty() {
                        snapshot.message = Some(format!("Loaded from spreadsheet ({})", errors.join("; ")));
                    }
                    return self.publish(snapshot);
                }
                Err(e) => {
                    log::warn!("Spreadsheet fetch failed: {}", e);
                    errors.push(format!("Spreadsheet: {e}"));
                }
            }
        }

        if errors.is_empty() {
            errors.push("No meeting source is configured".to_string());
        }
        FetchOutcome {
            snapshot: Arc::new(MeetingSnapshot::default()),
            error: Some(errors.join("; ")),
        }
    }

    fn publish(&self, snapshot: MeetingSnapshot) -> FetchOutcome {
        let snapshot = Arc::new(snapshot);
        self.store(snapshot.clone());
        FetchOutcome { snapshot, error: None }
    }

    /// Re-fetch; on failure hand back the cached list together with the error.
    pub async fn refresh(&self) -> FetchOutcome {
        let outcome = self.fetch().await;
        match outcome.error {
            None => outcome,
            Some(error) => FetchOutcome {
                snapshot: self.current(),
                error: Some(error),
            },
        }
    }

    /// Validate an admin decision and forward it to the workflow.
    ///
    /// Invalid actions fail with `ActionRejected` before any outbound call.
    /// Local state is untouched; callers re-fetch to see the new status.
    pub async fn submit_action(&self, form: ActionForm, processed_by: &str) -> Result<ActionOutcome, AppError> {
        self.submit_action_at(form, processed_by, Local::now().naive_local())
            .await
    }

    pub async fn submit_action_at(
        &self,
        form: ActionForm,
        processed_by: &str,
        now: NaiveDateTime,
    ) -> Result<ActionOutcome, AppError> {
        let action = form.validate(now).map_err(AppError::ActionRejected)?;
        let payload = action.to_payload(processed_by);
        log::info!(
            "Admin {} requested {} for {}",
            processed_by,
            action.kind.as_str(),
            action.request_id
        );

        let result = match &self.webhook {
            Some(webhook) => webhook.submit_action(&payload).await,
            None => Err(UpstreamError::NotConfigured("WEBHOOK_ACTION_URL")),
        };
        Ok(action_outcome(&action, result))
    }

    /// Validate a public request, stamp it and forward it to the intake workflow.
    pub async fn submit_request(&self, request: NewMeetingRequest) -> Result<RequestOutcome, AppError> {
        let errors = request.validate();
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let now = Utc::now();
        let request_id = new_request_id(now);
        let record = request.into_record(request_id.clone(), now);
        let payload = json!(record);

        let result = match &self.webhook {
            Some(webhook) => webhook.submit_request(&payload).await,
            None => Err(UpstreamError::NotConfigured("WEBHOOK_REQUEST_URL")),
        };

        Ok(match result.and_then(reply_accepted) {
            Ok(_) => {
                log::info!("Meeting request {} submitted", request_id);
                RequestOutcome {
                    success: true,
                    message: format!("Your meeting request {request_id} has been submitted"),
                    request_id,
                }
            }
            Err(e) => {
                log::error!("Meeting request {} could not be forwarded: {}", request_id, e);
                RequestOutcome {
                    success: false,
                    message: "Your request could not be submitted right now. Please try again later.".to_string(),
                    request_id,
                }
            }
        })
    }
}

/// Workflows may answer 200 with `{"success": false, "message": ...}`.
fn reply_accepted(reply: Value) -> Result<Value, UpstreamError> {
    if reply.get("success").and_then(Value::as_bool) == Some(false) {
        let message = reply
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("workflow reported failure")
            .to_string();
        return Err(UpstreamError::Decode(message));
    }
    Ok(reply)
}

fn action_outcome(action: &ValidatedAction, result: Result<Value, UpstreamError>) -> ActionOutcome {
    let status = action.kind.resulting_status().label();
    match result.and_then(reply_accepted) {
        Ok(reply) => {
            let message = reply
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Meeting {} marked {}", action.request_id, status));
            ActionOutcome {
                success: true,
                request_id: action.request_id.clone(),
                action: action.kind.as_str(),
                status,
                message,
                response: Some(reply).filter(|r| !r.is_null()),
            }
        }
        Err(e) => {
            log::error!("Action {} on {} failed: {}", action.kind.as_str(), action.request_id, e);
            ActionOutcome {
                success: false,
                request_id: action.request_id.clone(),
                action: action.kind.as_str(),
                status,
                message: format!("Action could not be delivered: {e}"),
                response: None,
            }
        }
    }
}

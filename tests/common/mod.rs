//! Shared test infrastructure: a scripted fake upstream and config helpers.
//!
//! `FakeUpstream` is a throwaway actix-web server on 127.0.0.1:0 that plays
//! the workflow engine and the spreadsheet export. Each path answers from a
//! list of scripted replies (the last one repeats) and records every hit.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::{App, HttpRequest, HttpResponse, HttpServer, dev::ServerHandle, http::StatusCode, web};
use serde_json::Value;

use meetdesk::config::AppConfig;
use meetdesk::gateway::MeetingGateway;
use meetdesk::models::meeting::MeetingRecord;

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASS: &str = "correct horse";

pub const LIST_PATH: &str = "/webhook/meetings";
pub const REQUEST_PATH: &str = "/webhook/request";
pub const ACTION_PATH: &str = "/webhook/action";
pub const SHEET_PATH: &str = "/sheet.csv";

// ============================================================================
// FAKE UPSTREAM
// ============================================================================

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
    pub content_type: &'static str,
    pub delay: Duration,
}

impl Reply {
    pub fn json(value: Value) -> Self {
        Reply {
            status: 200,
            body: value.to_string(),
            content_type: "application/json",
            delay: Duration::ZERO,
        }
    }

    pub fn text(body: &str) -> Self {
        Reply {
            status: 200,
            body: body.to_string(),
            content_type: "text/plain",
            delay: Duration::ZERO,
        }
    }

    pub fn status(status: u16) -> Self {
        Reply {
            status,
            body: String::new(),
            content_type: "text/plain",
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// One recorded inbound call.
#[derive(Debug, Clone)]
pub struct Hit {
    pub method: String,
    pub query: String,
    pub authorization: Option<String>,
    pub body: String,
}

impl Hit {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("hit body is JSON")
    }
}

#[derive(Default)]
struct Script {
    replies: HashMap<String, Vec<Reply>>,
    hits: HashMap<String, Vec<Hit>>,
}

pub struct FakeUpstream {
    pub base_url: String,
    script: Arc<Mutex<Script>>,
    handle: ServerHandle,
}

impl FakeUpstream {
    pub async fn start(routes: Vec<(&str, Vec<Reply>)>) -> Self {
        let script = Script {
            replies: routes
                .into_iter()
                .map(|(path, replies)| (path.to_string(), replies))
                .collect(),
            ..Default::default()
        };
        let script = Arc::new(Mutex::new(script));
        let data = web::Data::from(script.clone());

        let server = HttpServer::new(move || App::new().app_data(data.clone()).default_service(web::to(respond)))
            .workers(1)
            .bind(("127.0.0.1", 0))
            .expect("bind fake upstream");
        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        FakeUpstream {
            base_url: format!("http://{addr}"),
            script,
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn hits(&self, path: &str) -> Vec<Hit> {
        let script = self.script.lock().unwrap();
        script.hits.get(path).cloned().unwrap_or_default()
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}

async fn respond(req: HttpRequest, body: web::Bytes, script: web::Data<Mutex<Script>>) -> HttpResponse {
    let path = req.path().to_string();
    let reply = {
        let mut script = script.lock().unwrap();
        let hits = script.hits.entry(path.clone()).or_default();
        hits.push(Hit {
            method: req.method().to_string(),
            query: req.query_string().to_string(),
            authorization: req
                .headers()
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body: String::from_utf8_lossy(&body).into_owned(),
        });
        let index = hits.len() - 1;
        script
            .replies
            .get(&path)
            .and_then(|replies| replies.get(index).or_else(|| replies.last()))
            .cloned()
    };

    let Some(reply) = reply else {
        return HttpResponse::NotFound().finish();
    };
    if !reply.delay.is_zero() {
        actix_web::rt::time::sleep(reply.delay).await;
    }
    HttpResponse::build(StatusCode::from_u16(reply.status).unwrap())
        .content_type(reply.content_type)
        .body(reply.body)
}

// ============================================================================
// CONFIG AND FIXTURES
// ============================================================================

/// Config from key/value pairs, read the same way as the process environment.
pub fn config(pairs: &[(&str, String)]) -> AppConfig {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
    let mut config = AppConfig::from_lookup(|k| map.get(k).cloned());
    config.upstream_timeout = Duration::from_secs(5);
    config
}

/// Gateway wired to every webhook of `upstream`, plus its CSV export if asked.
pub fn gateway_for(upstream: &FakeUpstream, with_sheet: bool) -> MeetingGateway {
    let mut pairs = vec![
        ("WEBHOOK_LIST_URL", upstream.url(LIST_PATH)),
        ("WEBHOOK_REQUEST_URL", upstream.url(REQUEST_PATH)),
        ("WEBHOOK_ACTION_URL", upstream.url(ACTION_PATH)),
    ];
    if with_sheet {
        pairs.push(("SHEET_CSV_URL", upstream.url(SHEET_PATH)));
    }
    MeetingGateway::from_config(&config(&pairs)).expect("gateway")
}

pub fn meeting(id: &str, status: &str) -> Value {
    serde_json::json!({
        "requestId": id,
        "userName": format!("User {id}"),
        "userEmail": format!("{}@example.com", id.to_lowercase()),
        "meetingPurpose": "Quarterly review",
        "meetingType": "online",
        "priority": "normal",
        "status": status,
        "timestamp": "2026-03-01T09:00:00Z",
    })
}

pub fn ids(records: &[MeetingRecord]) -> Vec<String> {
    records.iter().map(|r| r.request_id.clone()).collect()
}

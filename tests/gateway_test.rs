//! Integration tests for the meeting lifecycle gateway against a fake
//! workflow engine and spreadsheet export.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde_json::json;

use meetdesk::errors::AppError;
use meetdesk::gateway::{MeetingGateway, SourceKind};
use meetdesk::models::meeting::{ActionForm, NewMeetingRequest, Status};

mod common;
use common::{
    ACTION_PATH, FakeUpstream, LIST_PATH, REQUEST_PATH, Reply, SHEET_PATH, config, gateway_for, ids, meeting,
};

const SHEET_CSV: &str = "Request_ID,Timestamp,User_Name,User_Email,Meeting_Purpose,Status,Urgency\r\n\
S1,2026-03-01 09:00:00,Ann,ann@example.com,Budget,Approved,high\r\n\
S2,2026-03-02 10:00:00,,bob@example.com,Hiring,Pending,low\r\n\
S3,2026-03-03 11:00:00,Cleo,cleo@example.com,\"Roadmap, Q2\",,normal\r\n";

fn action(request_id: &str, kind: &str, date: &str, time: &str) -> ActionForm {
    ActionForm {
        request_id: request_id.to_string(),
        action: kind.to_string(),
        new_date: date.to_string(),
        new_time: time.to_string(),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// fetch / refresh
// ---------------------------------------------------------------------------

#[actix_web::test]
async fn test_fetch_from_webhook_envelope() {
    let upstream = FakeUpstream::start(vec![(
        LIST_PATH,
        vec![Reply::json(json!({
            "meetings": [meeting("R1", "pending"), meeting("R2", "approved")],
            "statistics": { "totalCount": 40, "pendingCount": "12", "approvedCount": 20 },
            "lastUpdated": "2026-03-05T08:00:00Z"
        }))],
    )])
    .await;
    let gateway = gateway_for(&upstream, false);

    let outcome = gateway.fetch().await;
    assert!(outcome.is_success(), "unexpected error: {:?}", outcome.error);
    assert_eq!(ids(&outcome.snapshot.meetings), ["R1", "R2"]);
    assert_eq!(outcome.snapshot.source, Some(SourceKind::Webhook));
    assert_eq!(outcome.snapshot.last_updated.as_deref(), Some("2026-03-05T08:00:00Z"));

    // External totals win, the rest is counted locally
    let stats = &outcome.snapshot.statistics;
    assert_eq!(stats.total_count, 40);
    assert_eq!(stats.pending_count, 12);
    assert_eq!(stats.approved_count, 20);
    assert_eq!(stats.rejected_count, 0);

    assert_eq!(ids(&gateway.current().meetings), ["R1", "R2"]);
    assert_eq!(upstream.hits(LIST_PATH)[0].method, "GET");
    upstream.stop().await;
}

#[actix_web::test]
async fn test_unrecognised_webhook_reply_falls_back_to_sheet() {
    let upstream = FakeUpstream::start(vec![
        (LIST_PATH, vec![Reply::json(json!({ "message": "Workflow was started" }))]),
        (SHEET_PATH, vec![Reply::text(SHEET_CSV)]),
    ])
    .await;
    let gateway = gateway_for(&upstream, true);

    let outcome = gateway.fetch().await;
    assert!(outcome.is_success());
    let snapshot = &outcome.snapshot;
    assert_eq!(snapshot.source, Some(SourceKind::Sheet));
    // S2 has no name and is dropped
    assert_eq!(ids(&snapshot.meetings), ["S1", "S3"]);
    assert_eq!(snapshot.meetings[1].meeting_purpose, "Roadmap, Q2");
    assert_eq!(snapshot.meetings[1].status, Status::Pending);
    assert_eq!(snapshot.meetings[0].priority, "high");
    assert!(snapshot.message.as_deref().unwrap_or("").contains("spreadsheet"));
    upstream.stop().await;
}

#[actix_web::test]
async fn test_total_failure_returns_empty_list_and_keeps_cache() {
    let upstream = FakeUpstream::start(vec![(
        LIST_PATH,
        vec![Reply::json(json!([meeting("R1", "pending")])), Reply::status(500)],
    )])
    .await;
    let gateway = gateway_for(&upstream, false);

    assert!(gateway.fetch().await.is_success());

    let failed = gateway.fetch().await;
    let error = failed.error.expect("error indicator");
    assert!(error.contains("500"), "{error}");
    assert!(failed.snapshot.meetings.is_empty());
    assert_eq!(ids(&gateway.current().meetings), ["R1"]);

    // refresh hands back the cached list together with the error
    let refreshed = gateway.refresh().await;
    assert!(!refreshed.is_success());
    assert_eq!(ids(&refreshed.snapshot.meetings), ["R1"]);
    upstream.stop().await;
}

#[actix_web::test]
async fn test_unreachable_upstream_is_a_soft_failure() {
    let gateway = MeetingGateway::from_config(&config(&[(
        "WEBHOOK_LIST_URL",
        "http://127.0.0.1:9/meetings".to_string(),
    )]))
    .unwrap();
    let outcome = gateway.fetch().await;
    assert!(outcome.error.is_some());
    assert!(outcome.snapshot.meetings.is_empty());
}

#[actix_web::test]
async fn test_no_source_configured() {
    let gateway = MeetingGateway::from_config(&config(&[])).unwrap();
    let outcome = gateway.fetch().await;
    assert_eq!(outcome.error.as_deref(), Some("No meeting source is configured"));
}

#[actix_web::test]
async fn test_list_retries_once_on_auth_race() {
    let upstream = FakeUpstream::start(vec![(
        LIST_PATH,
        vec![Reply::status(401), Reply::json(json!({ "data": [meeting("R9", "approved")] }))],
    )])
    .await;
    let gateway = gateway_for(&upstream, false);

    let outcome = gateway.fetch().await;
    assert!(outcome.is_success(), "{:?}", outcome.error);
    assert_eq!(ids(&outcome.snapshot.meetings), ["R9"]);
    assert_eq!(upstream.hits(LIST_PATH).len(), 2);
    upstream.stop().await;
}

#[actix_web::test]
async fn test_auth_failure_is_not_retried_twice() {
    let upstream = FakeUpstream::start(vec![(LIST_PATH, vec![Reply::status(403)])]).await;
    let gateway = gateway_for(&upstream, false);

    let outcome = gateway.fetch().await;
    assert!(outcome.error.unwrap().contains("403"));
    assert_eq!(upstream.hits(LIST_PATH).len(), 2);

    // Other failures are not retried at all
    let upstream_500 = FakeUpstream::start(vec![(LIST_PATH, vec![Reply::status(503)])]).await;
    let gateway = gateway_for(&upstream_500, false);
    assert!(!gateway.fetch().await.is_success());
    assert_eq!(upstream_500.hits(LIST_PATH).len(), 1);

    upstream.stop().await;
    upstream_500.stop().await;
}

#[actix_web::test]
async fn test_overlapping_fetches_last_response_wins() {
    // First request answers slowly, second answers at once
    let upstream = FakeUpstream::start(vec![(
        LIST_PATH,
        vec![
            Reply::json(json!([meeting("SLOW1", "pending"), meeting("SLOW2", "pending")]))
                .delayed(Duration::from_millis(400)),
            Reply::json(json!([meeting("FAST1", "approved")])),
        ],
    )])
    .await;
    let gateway = Arc::new(gateway_for(&upstream, false));

    let (slow, fast) = tokio::join!(gateway.fetch(), async {
        actix_web::rt::time::sleep(Duration::from_millis(100)).await;
        gateway.fetch().await
    });

    assert_eq!(ids(&slow.snapshot.meetings), ["SLOW1", "SLOW2"]);
    assert_eq!(ids(&fast.snapshot.meetings), ["FAST1"]);
    // Whole lists are swapped, never merged
    assert_eq!(ids(&gateway.current().meetings), ["SLOW1", "SLOW2"]);
    upstream.stop().await;
}

#[actix_web::test]
async fn test_sheet_values_api_with_key() {
    let upstream = FakeUpstream::start(vec![(
        "/values",
        vec![Reply::json(json!({
            "range": "Requests!A1:E3",
            "values": [
                ["Request ID", "Name", "Email", "Purpose", "Status"],
                ["V1", "Dana", "dana@example.com", "Intro call", "rejected"],
                ["V2", "Eli", "eli@example.com", "Follow-up"]
            ]
        }))],
    )])
    .await;
    let gateway = MeetingGateway::from_config(&config(&[
        ("SHEET_VALUES_URL", upstream.url("/values")),
        ("SHEET_API_KEY", "k123".to_string()),
    ]))
    .unwrap();

    let outcome = gateway.fetch().await;
    assert!(outcome.is_success(), "{:?}", outcome.error);
    let meetings = &outcome.snapshot.meetings;
    assert_eq!(ids(meetings), ["V1", "V2"]);
    assert_eq!(meetings[0].status, Status::Rejected);
    assert_eq!(meetings[1].status, Status::Pending);
    assert_eq!(outcome.snapshot.statistics.rejected_count, 1);
    assert_eq!(upstream.hits("/values")[0].query, "key=k123");
    upstream.stop().await;
}

#[actix_web::test]
async fn test_list_post_method_and_auth_header() {
    let upstream = FakeUpstream::start(vec![(LIST_PATH, vec![Reply::json(json!([]))])]).await;
    let gateway = MeetingGateway::from_config(&config(&[
        ("WEBHOOK_LIST_URL", upstream.url(LIST_PATH)),
        ("WEBHOOK_LIST_METHOD", "POST".to_string()),
        ("WEBHOOK_AUTH_TOKEN", "Bearer t0ken".to_string()),
    ]))
    .unwrap();

    let outcome = gateway.fetch().await;
    assert!(outcome.is_success());
    assert!(outcome.snapshot.meetings.is_empty());

    let hit = &upstream.hits(LIST_PATH)[0];
    assert_eq!(hit.method, "POST");
    assert_eq!(hit.authorization.as_deref(), Some("Bearer t0ken"));
    assert_eq!(hit.json()["action"], "list_meetings");
    upstream.stop().await;
}

// ---------------------------------------------------------------------------
// submit_action
// ---------------------------------------------------------------------------

#[actix_web::test]
async fn test_reschedule_in_past_rejected_before_outbound_call() {
    let upstream = FakeUpstream::start(vec![(ACTION_PATH, vec![Reply::json(json!({ "success": true }))])]).await;
    let gateway = gateway_for(&upstream, false);
    let now = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap().and_hms_opt(10, 0, 0).unwrap();

    let result = gateway
        .submit_action_at(action("R1", "reschedule", "2026-04-30", "15:00"), "admin", now)
        .await;
    assert!(matches!(result, Err(AppError::ActionRejected(_))));

    let result = gateway
        .submit_action_at(action("R1", "cancel", "", ""), "admin", now)
        .await;
    assert!(matches!(result, Err(AppError::ActionRejected(_))));

    assert!(upstream.hits(ACTION_PATH).is_empty());
    upstream.stop().await;
}

#[actix_web::test]
async fn test_action_forwarded_without_touching_cache() {
    let upstream = FakeUpstream::start(vec![
        (LIST_PATH, vec![Reply::json(json!([meeting("R1", "pending")]))]),
        (ACTION_PATH, vec![Reply::json(json!({ "message": "Invitation sent" }))]),
    ])
    .await;
    let gateway = gateway_for(&upstream, false);
    gateway.fetch().await;
    let now = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap().and_hms_opt(10, 0, 0).unwrap();

    let mut form = action("R1", "Reschedule", "2026-05-02", "09:30");
    form.admin_notes = "Moved to Friday".to_string();
    let outcome = gateway.submit_action_at(form, "admin", now).await.unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.status, "Rescheduled");
    assert_eq!(outcome.message, "Invitation sent");

    let sent = upstream.hits(ACTION_PATH)[0].json();
    assert_eq!(sent["requestId"], "R1");
    assert_eq!(sent["action"], "reschedule");
    assert_eq!(sent["newDate"], "2026-05-02");
    assert_eq!(sent["newTime"], "09:30");
    assert_eq!(sent["adminNotes"], "Moved to Friday");
    assert_eq!(sent["processedBy"], "admin");

    // Status changes only show up after the next fetch
    assert_eq!(gateway.current().meetings[0].status, Status::Pending);
    upstream.stop().await;
}

#[actix_web::test]
async fn test_action_upstream_failure_is_structured() {
    let upstream = FakeUpstream::start(vec![(ACTION_PATH, vec![Reply::status(502)])]).await;
    let gateway = gateway_for(&upstream, false);

    let outcome = gateway
        .submit_action(action("R1", "approve", "", ""), "admin")
        .await
        .unwrap();
    assert!(!outcome.success);
    assert_eq!(outcome.status, "Approved");
    assert!(outcome.message.contains("502"));
    assert_eq!(upstream.hits(ACTION_PATH).len(), 1);
    upstream.stop().await;
}

// ---------------------------------------------------------------------------
// submit_request
// ---------------------------------------------------------------------------

fn valid_request() -> NewMeetingRequest {
    serde_json::from_value(json!({
        "userName": "Ann Lee",
        "userEmail": "Ann@Example.com",
        "userPhone": "+1 555 0100",
        "meetingType": "offline",
        "meetingPurpose": "Partnership",
        "preferredDate": "2026-06-01",
        "preferredTime": "14:00",
        "location": "HQ, room 4",
        "urgency": "high"
    }))
    .unwrap()
}

#[actix_web::test]
async fn test_request_forwarded_as_canonical_record() {
    let upstream = FakeUpstream::start(vec![(REQUEST_PATH, vec![Reply::text("Workflow was started")])]).await;
    let gateway = gateway_for(&upstream, false);

    let outcome = gateway.submit_request(valid_request()).await.unwrap();
    assert!(outcome.success);
    assert!(outcome.request_id.starts_with("REQ-"));

    let sent = upstream.hits(REQUEST_PATH)[0].json();
    assert_eq!(sent["requestId"], outcome.request_id.as_str());
    assert_eq!(sent["status"], "Pending");
    assert_eq!(sent["userEmail"], "ann@example.com");
    assert_eq!(sent["priority"], "high");
    assert_eq!(sent["estimatedDuration"], "60");
    upstream.stop().await;
}

#[actix_web::test]
async fn test_invalid_request_never_leaves_the_process() {
    let upstream = FakeUpstream::start(vec![(REQUEST_PATH, vec![Reply::json(json!({}))])]).await;
    let gateway = gateway_for(&upstream, false);

    let mut request = valid_request();
    request.location = String::new();
    request.user_email = "nope".to_string();
    match gateway.submit_request(request).await {
        Err(AppError::Validation(errors)) => assert_eq!(errors.len(), 2, "{errors:?}"),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(upstream.hits(REQUEST_PATH).is_empty());
    upstream.stop().await;
}

#[actix_web::test]
async fn test_request_soft_fails_when_workflow_down() {
    let upstream = FakeUpstream::start(vec![(
        REQUEST_PATH,
        vec![Reply::json(json!({ "success": false, "message": "sheet locked" }))],
    )])
    .await;
    let gateway = gateway_for(&upstream, false);

    let outcome = gateway.submit_request(valid_request()).await.unwrap();
    assert!(!outcome.success);
    assert!(outcome.request_id.starts_with("REQ-"));
    upstream.stop().await;
}

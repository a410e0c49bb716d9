use actix_session::Session;
use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde_json::json;

use crate::auth::session;
use crate::errors::AppError;
use crate::gateway::{FetchOutcome, MeetingGateway};
use crate::ingest::csv::escape_csv;
use crate::models::meeting::{ActionForm, Field, ListQuery, MeetingFilter, SortSpec};

/// `GET /api/admin/meetings`: re-fetch, then filter and sort the result.
/// When the upstream fails the cached list is served with `success: false`.
pub async fn list(
    gateway: web::Data<MeetingGateway>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    let outcome = gateway.refresh().await;
    Ok(HttpResponse::Ok().json(list_body(&outcome, &query)))
}

fn list_body(outcome: &FetchOutcome, query: &ListQuery) -> serde_json::Value {
    let snapshot = &outcome.snapshot;
    let filter = MeetingFilter::from_query(query);
    let sort = SortSpec::from_params(query.sort.as_deref(), query.dir.as_deref());

    let mut meetings = filter.apply(&snapshot.meetings);
    sort.sort(&mut meetings);

    let message = match (&outcome.error, &snapshot.message) {
        (Some(error), _) if snapshot.meetings.is_empty() => format!("Could not load meetings: {error}"),
        (Some(error), _) => format!("Showing cached meetings: {error}"),
        (None, Some(message)) => message.clone(),
        (None, None) => format!("Loaded {} meetings", snapshot.meetings.len()),
    };

    json!({
        "success": outcome.is_success(),
        "meetings": meetings,
        "statistics": snapshot.statistics,
        "totalCount": snapshot.meetings.len(),
        "filteredCount": meetings.len(),
        "source": snapshot.source,
        "fetchedAt": snapshot.fetched_at,
        "lastUpdated": snapshot.last_updated,
        "sort": { "column": sort.column.as_str(), "dir": sort.dir_str() },
        "message": message,
    })
}

pub async fn statistics(gateway: web::Data<MeetingGateway>) -> HttpResponse {
    let snapshot = gateway.current();
    HttpResponse::Ok().json(json!({
        "success": true,
        "statistics": snapshot.statistics,
        "fetchedAt": snapshot.fetched_at,
    }))
}

/// Cached list as CSV, with the spreadsheet's own column headers.
pub async fn export_csv(gateway: web::Data<MeetingGateway>) -> HttpResponse {
    let snapshot = gateway.current();

    let header: Vec<&str> = Field::ALL.iter().map(|f| f.sheet_header()).collect();
    let mut csv = header.join(",");
    csv.push('\n');
    for record in &snapshot.meetings {
        let cells: Vec<String> = Field::ALL.iter().map(|f| escape_csv(record.get(*f))).collect();
        csv.push_str(&cells.join(","));
        csv.push('\n');
    }

    let today = Utc::now().format("%Y-%m-%d");
    HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"meetings-{today}.csv\""),
        ))
        .body(csv)
}

/// `POST /api/admin/meeting/action`
pub async fn action(
    session: Session,
    gateway: web::Data<MeetingGateway>,
    body: web::Json<ActionForm>,
) -> Result<HttpResponse, AppError> {
    let admin = session::require_admin(&session)?;
    let outcome = gateway.submit_action(body.into_inner(), &admin).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// `POST /api/admin/sync-n8n`: manual refresh from the workflow.
pub async fn sync(gateway: web::Data<MeetingGateway>) -> HttpResponse {
    let outcome = gateway.refresh().await;
    let count = outcome.snapshot.meetings.len();
    let message = match &outcome.error {
        None => format!("Synced {count} meetings"),
        Some(error) => format!("Sync failed: {error}"),
    };
    HttpResponse::Ok().json(json!({
        "success": outcome.is_success(),
        "count": count,
        "statistics": outcome.snapshot.statistics,
        "fetchedAt": outcome.snapshot.fetched_at,
        "message": message,
    }))
}

use actix_web::{HttpRequest, HttpResponse, web};

use crate::auth::rate_limit::{Limiters, client_ip};
use crate::errors::AppError;
use crate::gateway::MeetingGateway;
use crate::models::meeting::NewMeetingRequest;

/// Public intake form. Validation failures are 400; an unreachable workflow
/// is reported in the body with `success: false`.
pub async fn submit(
    req: HttpRequest,
    gateway: web::Data<MeetingGateway>,
    limiters: web::Data<Limiters>,
    body: web::Json<NewMeetingRequest>,
) -> Result<HttpResponse, AppError> {
    let ip = client_ip(&req);
    if limiters.intake.is_blocked(ip) {
        log::warn!("Meeting request from {} rate limited", ip);
        return Err(AppError::RateLimited);
    }

    // Every attempt counts, including invalid ones and upstream failures
    limiters.intake.record(ip);
    let outcome = gateway.submit_request(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

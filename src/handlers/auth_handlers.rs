use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use serde_json::json;

use crate::auth::admin::AdminAccount;
use crate::auth::rate_limit::{Limiters, client_ip};
use crate::auth::session;
use crate::errors::AppError;

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

pub async fn login(
    req: HttpRequest,
    session: Session,
    admin: web::Data<AdminAccount>,
    limiters: web::Data<Limiters>,
    form: web::Json<LoginForm>,
) -> Result<HttpResponse, AppError> {
    // Rate-limit check BEFORE the password hash is touched
    let ip = client_ip(&req);
    if limiters.login.is_blocked(ip) {
        log::warn!("Login blocked for {}: too many failures", ip);
        return Err(AppError::RateLimited);
    }

    if !admin.verify(&form.username, &form.password) {
        limiters.login.record(ip);
        log::warn!("Failed admin login for '{}' from {}", form.username, ip);
        return Err(AppError::Unauthorized);
    }

    limiters.login.clear(ip);
    session::log_in(&session, admin.username())?;
    log::info!("Admin '{}' logged in from {}", admin.username(), ip);

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "username": admin.username(),
    })))
}

pub async fn logout(session: Session) -> HttpResponse {
    if let Some(user) = session::get_admin(&session) {
        log::info!("Admin '{}' logged out", user);
    }
    session::log_out(&session);
    HttpResponse::Ok().json(json!({ "success": true }))
}

/// Lets the admin page know whether to show the login form.
pub async fn session_info(session: Session) -> HttpResponse {
    match session::get_admin(&session) {
        Some(username) => HttpResponse::Ok().json(json!({
            "authenticated": true,
            "username": username,
        })),
        None => HttpResponse::Ok().json(json!({ "authenticated": false })),
    }
}

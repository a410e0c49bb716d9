pub mod admin_handlers;
pub mod auth_handlers;
pub mod request_handlers;

use actix_web::middleware::from_fn;
use actix_web::web;

use crate::auth::middleware::{require_admin, require_json_content_type};
use crate::errors::AppError;

/// Configure the JSON API under `/api`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::Validation(vec![err.to_string()]).into()
    }));
    cfg.service(
        web::scope("/api")
            .wrap(from_fn(require_json_content_type))
            .route("/meeting/request", web::post().to(request_handlers::submit))
            // Login endpoints BEFORE the guarded /admin scope
            .route("/admin/login", web::post().to(auth_handlers::login))
            .route("/admin/logout", web::post().to(auth_handlers::logout))
            .route("/admin/session", web::get().to(auth_handlers::session_info))
            .service(
                web::scope("/admin")
                    .wrap(from_fn(require_admin))
                    .route("/meetings", web::get().to(admin_handlers::list))
                    .route("/meetings/export.csv", web::get().to(admin_handlers::export_csv))
                    .route("/statistics", web::get().to(admin_handlers::statistics))
                    .route("/meeting/action", web::post().to(admin_handlers::action))
                    .route("/sync-n8n", web::post().to(admin_handlers::sync)),
            ),
    );
}

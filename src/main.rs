use std::sync::Arc;

use actix_web::{App, HttpResponse, HttpServer, middleware, web};

use meetdesk::auth::{admin::AdminAccount, rate_limit::Limiters};
use meetdesk::config::AppConfig;
use meetdesk::errors::AppError;
use meetdesk::gateway::MeetingGateway;
use meetdesk::{handlers, session_key, session_middleware, sync};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = AppConfig::from_env();

    let admin = AdminAccount::from_secret(&config.admin_username, &config.admin_secret)
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let gateway = MeetingGateway::from_config(&config).map_err(std::io::Error::other)?;
    let gateway = Arc::new(gateway);

    if config.webhook.list_url.is_none() && config.sheet.source.is_none() {
        log::warn!("Neither WEBHOOK_LIST_URL nor a spreadsheet source is set; the admin list will be empty");
    }
    if let Some(every) = config.sync_interval {
        log::info!("Background sync every {}s", every.as_secs());
        sync::spawn_sync(gateway.clone(), every);
    }

    let key = session_key(config.session_key.as_deref());
    let cookie_secure = config.cookie_secure;
    let gateway = web::Data::from(gateway);
    let admin = web::Data::new(admin);
    let limiters = web::Data::new(Limiters::default());

    log::info!("Starting server at http://{}", config.bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(session_middleware(key.clone(), cookie_secure))
            .wrap(middleware::Logger::default())
            .app_data(gateway.clone())
            .app_data(admin.clone())
            .app_data(limiters.clone())
            .route("/health", web::get().to(|| async { HttpResponse::Ok().body("ok") }))
            .configure(handlers::configure)
            .default_service(web::to(|| async { Err::<HttpResponse, _>(AppError::NotFound) }))
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}

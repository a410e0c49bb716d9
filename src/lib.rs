pub mod auth;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod handlers;
pub mod ingest;
pub mod models;
pub mod sync;
pub mod upstream;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;

/// Minimum SESSION_KEY length accepted by `Key::from`.
const SESSION_KEY_MIN_LEN: usize = 64;

/// Session signing key from config, or a random one (sessions lost on restart).
pub fn session_key(configured: Option<&str>) -> Key {
    match configured {
        Some(val) if val.len() >= SESSION_KEY_MIN_LEN => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Some(val) => {
            log::warn!(
                "SESSION_KEY too short ({} bytes, need {}+), generating random key",
                val.len(),
                SESSION_KEY_MIN_LEN
            );
            Key::generate()
        }
        None => {
            log::warn!("No SESSION_KEY set, generating random key (sessions lost on restart)");
            Key::generate()
        }
    }
}

pub fn session_middleware(key: Key, secure: bool) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("meetdesk_session".to_string())
        .cookie_secure(secure)
        .cookie_http_only(true)
        .build()
}

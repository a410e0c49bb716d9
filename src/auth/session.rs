use actix_session::Session;

use crate::errors::AppError;

const ADMIN_KEY: &str = "admin_user";

/// Username of the logged-in admin, if any.
pub fn get_admin(session: &Session) -> Option<String> {
    session.get::<String>(ADMIN_KEY).unwrap_or(None)
}

pub fn require_admin(session: &Session) -> Result<String, AppError> {
    get_admin(session).ok_or(AppError::Unauthorized)
}

/// Mark the session as authenticated, rotating its id first.
pub fn log_in(session: &Session, username: &str) -> Result<(), AppError> {
    session.renew();
    session.insert(ADMIN_KEY, username)?;
    Ok(())
}

pub fn log_out(session: &Session) {
    session.purge();
}

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::config::AdminSecret;
use crate::errors::AppError;

pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| e.to_string())?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, String> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| e.to_string())?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// The single configured administrator.
#[derive(Debug, Clone)]
pub struct AdminAccount {
    username: String,
    /// `None` disables admin login entirely.
    password_hash: Option<String>,
}

impl AdminAccount {
    /// Plain passwords from the environment are hashed once here and then dropped.
    pub fn from_secret(username: &str, secret: &AdminSecret) -> Result<Self, AppError> {
        let password_hash = match secret {
            AdminSecret::Hash(hash) => {
                PasswordHash::new(hash).map_err(|e| AppError::Hash(format!("ADMIN_PASSWORD_HASH: {e}")))?;
                Some(hash.clone())
            }
            AdminSecret::Plain(plain) => {
                log::warn!("ADMIN_PASSWORD is set in plain text, prefer ADMIN_PASSWORD_HASH");
                Some(hash_password(plain).map_err(AppError::Hash)?)
            }
            AdminSecret::Missing => {
                log::warn!("No admin password configured, admin login is disabled");
                None
            }
        };
        Ok(Self {
            username: username.to_string(),
            password_hash,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Both checks always run so a wrong username costs the same as a wrong password.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        let Some(hash) = &self.password_hash else {
            return false;
        };
        let name_ok = constant_time_eq(&self.username, username);
        let password_ok = verify_password(password, hash).unwrap_or_else(|e| {
            log::error!("Stored admin hash unreadable: {}", e);
            false
        });
        name_ok && password_ok
    }
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

use tracing::debug;

use crate::shared::AppError;

pub const BCRYPT_COST: u32 = 10;

/// Hashes on the blocking pool; bcrypt at cost 10 takes tens of milliseconds
pub async fn hash_password(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST))
        .await
        .map_err(|e| AppError::Internal(format!("password hashing task failed: {e}")))?
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
}

pub async fn verify_password(password: String, password_hash: String) -> Result<bool, AppError> {
    let matched = tokio::task::spawn_blocking(move || bcrypt::verify(password, &password_hash))
        .await
        .map_err(|e| AppError::Internal(format!("password verification task failed: {e}")))?
        .map_err(|e| AppError::Internal(format!("password verification failed: {e}")))?;

    debug!(matched, "Verified password against stored hash");
    Ok(matched)
}

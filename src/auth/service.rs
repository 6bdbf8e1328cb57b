use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    password::{hash_password, verify_password},
    revocation::RevocationList,
    token::{extract_token, TokenConfig},
    types::{LoginRequest, RegisterRequest},
};
use crate::shared::AppError;
use crate::user::{models::UserModel, repository::UserRepository};

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Service layer for registration, login and logout
pub struct AuthService {
    user_repository: Arc<dyn UserRepository + Send + Sync>,
    token_config: TokenConfig,
    revoked_tokens: Arc<RevocationList>,
}

impl AuthService {
    pub fn new(
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        token_config: TokenConfig,
        revoked_tokens: Arc<RevocationList>,
    ) -> Self {
        Self {
            user_repository,
            token_config,
            revoked_tokens,
        }
    }

    /// Hashes the password and stores the new user
    #[instrument(skip(self, request), fields(email = %request.email, role = %request.role))]
    pub async fn register(&self, request: RegisterRequest) -> Result<UserModel, AppError> {
        let password_hash = hash_password(request.password).await?;
        let user = UserModel::new(request.email, password_hash, request.role, request.fname);

        self.user_repository.create_user(&user).await?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Returns a signed token when the credentials match.
    ///
    /// Unknown e-mail and wrong password fail with the same message.
    #[instrument(skip(self, request), fields(email = request.email.as_deref().unwrap_or_default()))]
    pub async fn login(&self, request: LoginRequest) -> Result<String, AppError> {
        let (Some(email), Some(password)) = (request.email, request.password) else {
            warn!("Login attempt without email or password");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        let Some(user) = self.user_repository.find_by_email(&email).await? else {
            warn!("Login attempt for unknown email");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        if !verify_password(password, user.password_hash).await? {
            warn!("Login attempt with wrong password");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let token = self.token_config.create_token(&user.email)?;
        info!("User logged in");
        Ok(token)
    }

    /// Revokes the presented token if it is still valid; anything else is ignored
    #[instrument(skip(self, auth_header))]
    pub async fn logout(&self, auth_header: Option<&str>) {
        let Some(header) = auth_header else {
            return;
        };

        match self.token_config.validate_token(extract_token(header)) {
            Ok(claims) => {
                self.revoked_tokens.revoke(&claims.jti, claims.exp).await;
                info!(email = %claims.email, "Token revoked on logout");
            }
            Err(e) => warn!("Logout with unusable token: {}", e),
        }
    }
}

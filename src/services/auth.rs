//! Authentication and account service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    forms::FieldErrors,
    models::{
        enums::Role,
        user::{Account, NewAccount, ProfileUpdate, UserClaims, UserQuery},
    },
    policy::Principal,
    repository::Repository,
};

/// Issued token and the account it belongs to
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: Account,
}

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new account with the Member role and log it in
    pub async fn register(&self, account: NewAccount) -> AppResult<LoginResponse> {
        if self.repository.users.username_exists(&account.username).await? {
            return Err(FieldErrors::single("username", "A user with that username already exists.").into());
        }

        let hash = self.hash_password(&account.password)?;
        let created = self.repository.users.create(&account, &hash).await?;
        tracing::info!(user_id = created.id, username = %created.username, "account registered");

        self.issue(created)
    }

    /// Authenticate by username and password
    pub async fn login(&self, username: &str, password: &str) -> AppResult<LoginResponse> {
        let invalid = || AppError::Authentication("Invalid username or password".to_string());

        let credentials = self
            .repository
            .users
            .get_credentials(username.trim())
            .await?
            .ok_or_else(invalid)?;

        if !credentials.is_active {
            return Err(AppError::Authentication("Account is disabled".to_string()));
        }
        if !self.verify_password(&credentials.password, password)? {
            tracing::debug!(username = %credentials.username, "login rejected");
            return Err(invalid());
        }

        let account = self.repository.users.get_by_id(credentials.id).await?;
        self.issue(account)
    }

    fn issue(&self, account: Account) -> AppResult<LoginResponse> {
        let now = Utc::now().timestamp();
        let expires_in = self.config.jwt_expiration_hours as i64 * 3600;
        let claims = UserClaims {
            sub: account.username.clone(),
            user_id: account.id,
            exp: now + expires_in,
            iat: now,
        };
        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in,
            user: account,
        })
    }

    fn decode_token(&self, token: &str) -> AppResult<UserClaims> {
        UserClaims::from_token(token, &self.config.jwt_secret)
            .map_err(|_| AppError::Authentication("Invalid or expired token".to_string()))
    }

    /// Resolve a bearer token to the caller's identity. Role and active flag
    /// come from the database on every request, never from the token.
    pub async fn principal_from_token(&self, token: &str) -> AppResult<Principal> {
        let claims = self.decode_token(token)?;
        let status = self
            .repository
            .users
            .get_status(claims.user_id)
            .await?
            .ok_or_else(|| AppError::Authentication("User no longer exists".to_string()))?;

        if !status.is_active {
            return Err(AppError::Authentication("Account is disabled".to_string()));
        }
        Ok(status.principal())
    }

    fn verify_password(&self, hash: &str, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    // =========================================================================
    // ACCOUNTS
    // =========================================================================

    pub async fn get_account(&self, id: i32) -> AppResult<Account> {
        self.repository.users.get_by_id(id).await
    }

    pub async fn update_profile(&self, id: i32, update: &ProfileUpdate) -> AppResult<Account> {
        self.repository.users.update_profile(id, update).await
    }

    pub async fn search_users(&self, query: &UserQuery) -> AppResult<(Vec<Account>, i64)> {
        self.repository.users.search(query).await
    }

    pub async fn set_role(&self, id: i32, role: Role) -> AppResult<Account> {
        let account = self.repository.users.set_role(id, role).await?;
        tracing::info!(user_id = id, role = %role, "role changed");
        Ok(account)
    }

    /// Delete an account. Admins cannot delete themselves.
    pub async fn delete_user(&self, caller: &Principal, id: i32) -> AppResult<()> {
        if caller.user_id == id {
            return Err(AppError::BadRequest("You cannot delete your own account".to_string()));
        }
        self.repository.users.delete(id).await?;
        tracing::info!(user_id = id, deleted_by = caller.user_id, "user deleted");
        Ok(())
    }
}

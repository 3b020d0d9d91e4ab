//! User, profile and token claim types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::Role;
use crate::policy::Principal;

/// Credentials row used for login
#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    pub id: i32,
    pub username: String,
    /// Argon2 PHC string
    pub password: String,
    pub is_active: bool,
    pub role: Option<String>,
}

/// Per-request account state behind a bearer token
#[derive(Debug, Clone, FromRow)]
pub struct UserStatus {
    pub id: i32,
    pub username: String,
    pub is_active: bool,
    pub role: Option<String>,
}

impl UserStatus {
    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.id,
            username: self.username.clone(),
            role: self.role.as_deref().and_then(|r| r.parse().ok()),
        }
    }
}

/// Internal row structure for account queries (role kept as text)
#[derive(Debug, Clone, FromRow)]
pub struct AccountRow {
    id: i32,
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    is_active: bool,
    date_joined: DateTime<Utc>,
    role: Option<String>,
    bio: Option<String>,
    website: Option<String>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: row.id,
            username: row.username,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            is_active: row.is_active,
            date_joined: row.date_joined,
            // unknown roles are surfaced as "no role", never as an error
            role: row.role.and_then(|r| r.parse().ok()),
            bio: row.bio.unwrap_or_default(),
            website: row.website.unwrap_or_default(),
        }
    }
}

/// A user together with its profile
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Account {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    /// `null` when the user has no profile or an unrecognized role
    pub role: Option<Role>,
    pub bio: String,
    pub website: String,
}

/// User list query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct UserQuery {
    /// Exact role filter
    pub role: Option<Role>,
    /// Substring of username or email
    pub search: Option<String>,
    /// `username` or `date_joined`, `-` prefix for descending
    pub ordering: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegistrationForm {
    #[validate(length(min = 3, max = 150, message = "Username must be between 3 and 150 characters"))]
    pub username: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub password_confirm: String,
}

/// Cleaned registration; the password is still plain text here
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Update own profile request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ProfileForm {
    #[validate(length(max = 150, message = "First name must be at most 150 characters"))]
    pub first_name: Option<String>,
    #[validate(length(max = 150, message = "Last name must be at most 150 characters"))]
    pub last_name: Option<String>,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: Option<String>,
    pub bio: Option<String>,
    #[validate(length(max = 200, message = "Website must be at most 200 characters"))]
    pub website: Option<String>,
}

/// Cleaned profile update; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub website: Option<String>,
}

/// Change a user's role (admin only)
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRole {
    /// Admin, Librarian or Member
    pub role: String,
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    /// Role and active flag are looked up per request from this id
    pub user_id: i32,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims() -> UserClaims {
        let now = Utc::now().timestamp();
        UserClaims {
            sub: "jane".to_string(),
            user_id: 3,
            exp: now + 3600,
            iat: now,
        }
    }

    fn status(role: Option<&str>) -> UserStatus {
        UserStatus {
            id: 3,
            username: "jane".to_string(),
            is_active: true,
            role: role.map(str::to_string),
        }
    }

    #[test]
    fn test_token_round_trip() {
        let token = claims().create_token("secret").unwrap();
        let parsed = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed.user_id, 3);
        assert_eq!(parsed.sub, "jane");
    }

    #[test]
    fn test_token_carries_no_role() {
        let token = claims().create_token("secret").unwrap();
        let raw = jsonwebtoken::decode::<serde_json::Value>(
            &token,
            &jsonwebtoken::DecodingKey::from_secret(b"secret"),
            &jsonwebtoken::Validation::default(),
        )
        .unwrap()
        .claims;
        assert!(raw.get("role").is_none());
    }

    #[test]
    fn test_token_rejects_wrong_secret() {
        let token = claims().create_token("secret").unwrap();
        assert!(UserClaims::from_token(&token, "other").is_err());
    }

    #[test]
    fn test_status_role_parses() {
        assert_eq!(status(Some("Librarian")).principal().role, Some(Role::Librarian));
    }

    #[test]
    fn test_unknown_role_becomes_none() {
        assert_eq!(status(Some("Janitor")).principal().role, None);
        assert_eq!(status(None).principal().role, None);
    }
}

//! Authentication and own-profile endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::user::{Account, ProfileForm, RegistrationForm},
    services::auth::LoginResponse,
    AppState,
};

use super::{AuthenticatedUser, JsonBody};

/// Login request body
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Register a new account. The account gets the Member role.
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegistrationForm,
    responses(
        (status = 201, description = "Account created", body = LoginResponse),
        (status = 400, description = "Invalid registration", body = crate::error::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    body: JsonBody<RegistrationForm>,
) -> AppResult<(StatusCode, Json<LoginResponse>)> {
    let Json(form) = body?;
    let account = form.clean()?;
    let response = state.services.auth.register(account).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Authenticate and obtain a bearer token
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    body: JsonBody<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let Json(request) = body?;
    let response = state
        .services
        .auth
        .login(&request.username, &request.password)
        .await?;
    Ok(Json(response))
}

/// Log out. Tokens are stateless; the client discards its copy.
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Logged out"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn logout(AuthenticatedUser(principal): AuthenticatedUser) -> StatusCode {
    tracing::info!(user_id = principal.user_id, "logout");
    StatusCode::NO_CONTENT
}

/// Current account
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = Account),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> AppResult<Json<Account>> {
    let account = state.services.auth.get_account(principal.user_id).await?;
    Ok(Json(account))
}

/// Own profile
#[utoipa::path(
    get,
    path = "/auth/profile",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profile", body = Account),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> AppResult<Json<Account>> {
    let account = state.services.auth.get_account(principal.user_id).await?;
    Ok(Json(account))
}

/// Update own names, email, bio and website
#[utoipa::path(
    put,
    path = "/auth/profile",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = ProfileForm,
    responses(
        (status = 200, description = "Profile updated", body = Account),
        (status = 400, description = "Invalid profile", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    body: JsonBody<ProfileForm>,
) -> AppResult<Json<Account>> {
    let Json(form) = body?;
    let update = form.clean()?;
    let account = state
        .services
        .auth
        .update_profile(principal.user_id, &update)
        .await?;
    Ok(Json(account))
}

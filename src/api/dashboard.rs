//! Dashboard endpoint

use axum::{extract::State, Json};

use crate::{error::AppResult, services::dashboard::Dashboard, AppState};

use super::AuthenticatedUser;

/// Counts and latest records for everything the caller may view
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard", body = Dashboard),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn dashboard(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> AppResult<Json<Dashboard>> {
    let dashboard = state.services.dashboard.for_user(&principal).await?;
    Ok(Json(dashboard))
}

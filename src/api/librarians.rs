//! Librarian endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        enums::{Action, EntityType},
        library::{Librarian, LibrarianForm, LibrarianQuery},
    },
    AppState,
};

use super::{AuthenticatedUser, JsonBody, PaginatedResponse};

#[utoipa::path(
    get,
    path = "/librarians",
    tag = "librarians",
    security(("bearer_auth" = [])),
    params(LibrarianQuery),
    responses(
        (status = 200, description = "List of librarians", body = PaginatedResponse<Librarian>),
        (status = 403, description = "Insufficient rights")
    )
)]
pub async fn list_librarians(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Query(query): Query<LibrarianQuery>,
) -> AppResult<Json<PaginatedResponse<Librarian>>> {
    principal.require(Action::View, EntityType::Librarian)?;

    let (librarians, total) = state.services.catalog.search_librarians(&query).await?;
    Ok(Json(PaginatedResponse::new(librarians, total, query.page, query.per_page)))
}

#[utoipa::path(
    get,
    path = "/librarians/{id}",
    tag = "librarians",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Librarian ID")),
    responses(
        (status = 200, description = "Librarian details", body = Librarian),
        (status = 404, description = "Librarian not found")
    )
)]
pub async fn get_librarian(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Librarian>> {
    principal.require(Action::View, EntityType::Librarian)?;

    let librarian = state.services.catalog.get_librarian(id).await?;
    Ok(Json(librarian))
}

/// Assign a librarian to a library (one per library)
#[utoipa::path(
    post,
    path = "/librarians",
    tag = "librarians",
    security(("bearer_auth" = [])),
    request_body = LibrarianForm,
    responses(
        (status = 201, description = "Librarian created", body = Librarian),
        (status = 400, description = "Invalid librarian or library already staffed", body = crate::error::ErrorResponse),
        (status = 403, description = "Insufficient rights")
    )
)]
pub async fn create_librarian(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    body: JsonBody<LibrarianForm>,
) -> AppResult<(StatusCode, Json<Librarian>)> {
    principal.require(Action::Create, EntityType::Librarian)?;
    let Json(form) = body?;

    let input = form.clean()?;
    let librarian = state.services.catalog.create_librarian(&input).await?;
    Ok((StatusCode::CREATED, Json(librarian)))
}

#[utoipa::path(
    put,
    path = "/librarians/{id}",
    tag = "librarians",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Librarian ID")),
    request_body = LibrarianForm,
    responses(
        (status = 200, description = "Librarian updated", body = Librarian),
        (status = 400, description = "Invalid librarian", body = crate::error::ErrorResponse),
        (status = 403, description = "Insufficient rights"),
        (status = 404, description = "Librarian not found")
    )
)]
pub async fn update_librarian(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
    body: JsonBody<LibrarianForm>,
) -> AppResult<Json<Librarian>> {
    principal.require(Action::Edit, EntityType::Librarian)?;
    let Json(form) = body?;

    let input = form.clean()?;
    let librarian = state.services.catalog.update_librarian(id, &input).await?;
    Ok(Json(librarian))
}

#[utoipa::path(
    delete,
    path = "/librarians/{id}",
    tag = "librarians",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Librarian ID")),
    responses(
        (status = 204, description = "Librarian deleted"),
        (status = 403, description = "Insufficient rights"),
        (status = 404, description = "Librarian not found")
    )
)]
pub async fn delete_librarian(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    principal.require(Action::Delete, EntityType::Librarian)?;

    state.services.catalog.delete_librarian(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

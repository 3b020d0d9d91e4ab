//! Library endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        enums::{Action, EntityType},
        library::{Library, LibraryBooksRequest, LibraryForm, LibraryQuery},
    },
    AppState,
};

use super::{AuthenticatedUser, JsonBody, PaginatedResponse};

/// List libraries
#[utoipa::path(
    get,
    path = "/libraries",
    tag = "libraries",
    security(("bearer_auth" = [])),
    params(LibraryQuery),
    responses(
        (status = 200, description = "List of libraries", body = PaginatedResponse<Library>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_libraries(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Query(query): Query<LibraryQuery>,
) -> AppResult<Json<PaginatedResponse<Library>>> {
    principal.require(Action::View, EntityType::Library)?;

    let (libraries, total) = state.services.catalog.search_libraries(&query).await?;
    Ok(Json(PaginatedResponse::new(libraries, total, query.page, query.per_page)))
}

/// Get a library with its books and librarian
#[utoipa::path(
    get,
    path = "/libraries/{id}",
    tag = "libraries",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Library ID")),
    responses(
        (status = 200, description = "Library details", body = Library),
        (status = 404, description = "Library not found")
    )
)]
pub async fn get_library(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Library>> {
    principal.require(Action::View, EntityType::Library)?;

    let library = state.services.catalog.get_library(id).await?;
    Ok(Json(library))
}

/// Create a library
#[utoipa::path(
    post,
    path = "/libraries",
    tag = "libraries",
    security(("bearer_auth" = [])),
    request_body = LibraryForm,
    responses(
        (status = 201, description = "Library created", body = Library),
        (status = 400, description = "Invalid library", body = crate::error::ErrorResponse),
        (status = 403, description = "Insufficient rights")
    )
)]
pub async fn create_library(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    body: JsonBody<LibraryForm>,
) -> AppResult<(StatusCode, Json<Library>)> {
    principal.require(Action::Create, EntityType::Library)?;
    let Json(form) = body?;

    let input = form.clean()?;
    let library = state.services.catalog.create_library(&input).await?;
    Ok((StatusCode::CREATED, Json(library)))
}

/// Update a library
#[utoipa::path(
    put,
    path = "/libraries/{id}",
    tag = "libraries",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Library ID")),
    request_body = LibraryForm,
    responses(
        (status = 200, description = "Library updated", body = Library),
        (status = 400, description = "Invalid library", body = crate::error::ErrorResponse),
        (status = 403, description = "Insufficient rights"),
        (status = 404, description = "Library not found")
    )
)]
pub async fn update_library(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
    body: JsonBody<LibraryForm>,
) -> AppResult<Json<Library>> {
    principal.require(Action::Edit, EntityType::Library)?;
    let Json(form) = body?;

    let input = form.clean()?;
    let library = state.services.catalog.update_library(id, &input).await?;
    Ok(Json(library))
}

/// Replace the set of books held by a library
#[utoipa::path(
    put,
    path = "/libraries/{id}/books",
    tag = "libraries",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Library ID")),
    request_body = LibraryBooksRequest,
    responses(
        (status = 200, description = "Books replaced", body = Library),
        (status = 400, description = "Unknown book ids", body = crate::error::ErrorResponse),
        (status = 403, description = "Insufficient rights"),
        (status = 404, description = "Library not found")
    )
)]
pub async fn set_library_books(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
    body: JsonBody<LibraryBooksRequest>,
) -> AppResult<Json<Library>> {
    principal.require(Action::Edit, EntityType::Library)?;
    let Json(request) = body?;

    let library = state
        .services
        .catalog
        .set_library_books(id, &request.book_ids)
        .await?;
    Ok(Json(library))
}

/// Delete a library; its books are kept
#[utoipa::path(
    delete,
    path = "/libraries/{id}",
    tag = "libraries",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Library ID")),
    responses(
        (status = 204, description = "Library deleted"),
        (status = 403, description = "Insufficient rights"),
        (status = 404, description = "Library not found")
    )
)]
pub async fn delete_library(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    principal.require(Action::Delete, EntityType::Library)?;

    state.services.catalog.delete_library(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

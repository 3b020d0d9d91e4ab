//! Author endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        author::{Author, AuthorForm, AuthorQuery},
        enums::{Action, EntityType},
    },
    policy,
    AppState,
};

use super::{AuthenticatedUser, JsonBody, MaybeUser, PaginatedResponse};

/// List authors with search and pagination
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    params(AuthorQuery),
    responses(
        (status = 200, description = "List of authors", body = PaginatedResponse<Author>),
        (status = 400, description = "Invalid ordering", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_authors(
    State(state): State<AppState>,
    MaybeUser(principal): MaybeUser,
    Query(query): Query<AuthorQuery>,
) -> AppResult<Json<PaginatedResponse<Author>>> {
    policy::require(principal.as_ref(), Action::View, EntityType::Author)?;

    let (authors, total) = state.services.catalog.search_authors(&query).await?;
    Ok(Json(PaginatedResponse::new(authors, total, query.page, query.per_page)))
}

/// Get an author with its books
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author details", body = Author),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<AppState>,
    MaybeUser(principal): MaybeUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Author>> {
    policy::require(principal.as_ref(), Action::View, EntityType::Author)?;

    let author = state.services.catalog.get_author(id).await?;
    Ok(Json(author))
}

/// Create an author
#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    security(("bearer_auth" = [])),
    request_body = AuthorForm,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 400, description = "Invalid author", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Insufficient rights")
    )
)]
pub async fn create_author(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    body: JsonBody<AuthorForm>,
) -> AppResult<(StatusCode, Json<Author>)> {
    principal.require(Action::Create, EntityType::Author)?;
    let Json(form) = body?;

    let input = form.clean()?;
    let author = state.services.catalog.create_author(&input).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

/// Update an author
#[utoipa::path(
    put,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Author ID")),
    request_body = AuthorForm,
    responses(
        (status = 200, description = "Author updated", body = Author),
        (status = 400, description = "Invalid author", body = crate::error::ErrorResponse),
        (status = 403, description = "Insufficient rights"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
    body: JsonBody<AuthorForm>,
) -> AppResult<Json<Author>> {
    principal.require(Action::Edit, EntityType::Author)?;
    let Json(form) = body?;

    let input = form.clean()?;
    let author = state.services.catalog.update_author(id, &input).await?;
    Ok(Json(author))
}

/// Delete an author and all of its books
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 403, description = "Insufficient rights"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn delete_author(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    principal.require(Action::Delete, EntityType::Author)?;

    state.services.catalog.delete_author(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! Book endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookForm, BookQuery, BulkBookRequest},
        enums::{Action, EntityType},
    },
    policy::{self, PermissionSet},
    AppState,
};

use super::{AuthenticatedUser, JsonBody, MaybeUser, PaginatedResponse};

/// List books with filters, search and pagination
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "List of books", body = PaginatedResponse<Book>),
        (status = 400, description = "Invalid ordering", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    MaybeUser(principal): MaybeUser,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<PaginatedResponse<Book>>> {
    policy::require(principal.as_ref(), Action::View, EntityType::Book)?;

    let (books, total) = state.services.catalog.search_books(&query).await?;
    Ok(Json(PaginatedResponse::new(books, total, query.page, query.per_page)))
}

/// Get a book with the libraries holding it
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    MaybeUser(principal): MaybeUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Book>> {
    policy::require(principal.as_ref(), Action::View, EntityType::Book)?;

    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// What the caller may do with a book
#[utoipa::path(
    get,
    path = "/books/{id}/permissions",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Permission map", body = PermissionSet),
        (status = 404, description = "Book not found")
    )
)]
pub async fn book_permissions(
    State(state): State<AppState>,
    MaybeUser(principal): MaybeUser,
    Path(id): Path<i32>,
) -> AppResult<Json<PermissionSet>> {
    policy::require(principal.as_ref(), Action::View, EntityType::Book)?;

    state.services.catalog.get_book(id).await?;
    Ok(Json(policy::permissions_for(principal.as_ref(), EntityType::Book)))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = BookForm,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid book", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Insufficient rights")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    body: JsonBody<BookForm>,
) -> AppResult<(StatusCode, Json<Book>)> {
    principal.require(Action::Create, EntityType::Book)?;
    let Json(form) = body?;

    let input = form.clean()?;
    let book = state.services.catalog.create_book(&input).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Update a book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    request_body = BookForm,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid book", body = crate::error::ErrorResponse),
        (status = 403, description = "Insufficient rights"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
    body: JsonBody<BookForm>,
) -> AppResult<Json<Book>> {
    principal.require(Action::Edit, EntityType::Book)?;
    let Json(form) = body?;

    let input = form.clean()?;
    let book = state.services.catalog.update_book(id, &input).await?;
    Ok(Json(book))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 403, description = "Insufficient rights"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    principal.require(Action::Delete, EntityType::Book)?;

    state.services.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Bulk operations on books (not available)
#[utoipa::path(
    post,
    path = "/books/bulk",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = BulkBookRequest,
    responses(
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Insufficient rights"),
        (status = 501, description = "Bulk operations are not implemented", body = crate::error::ErrorResponse)
    )
)]
pub async fn bulk_books(
    AuthenticatedUser(principal): AuthenticatedUser,
    body: JsonBody<BulkBookRequest>,
) -> AppResult<StatusCode> {
    principal.require(Action::Edit, EntityType::Book)?;
    let Json(request) = body?;

    tracing::debug!(operation = ?request.operation, count = request.ids.len(), "bulk book request");
    Err(AppError::NotImplemented(
        "Bulk book operations are not implemented".to_string(),
    ))
}

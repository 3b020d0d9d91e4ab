//! Blog post endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        enums::{Action, EntityType},
        post::{Post, PostForm, PostQuery, SearchQuery},
    },
    policy,
    AppState,
};

use super::{AuthenticatedUser, JsonBody, MaybeUser, PaginatedResponse};

/// List posts, newest first by default
#[utoipa::path(
    get,
    path = "/posts",
    tag = "posts",
    params(PostQuery),
    responses(
        (status = 200, description = "List of posts", body = PaginatedResponse<Post>),
        (status = 400, description = "Invalid ordering", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_posts(
    State(state): State<AppState>,
    MaybeUser(principal): MaybeUser,
    Query(query): Query<PostQuery>,
) -> AppResult<Json<PaginatedResponse<Post>>> {
    policy::require(principal.as_ref(), Action::View, EntityType::Post)?;

    let (posts, total) = state.services.blog.search_posts(&query).await?;
    Ok(Json(PaginatedResponse::new(posts, total, query.page, query.per_page)))
}

/// Free-text search over post titles, contents and tags
#[utoipa::path(
    get,
    path = "/search",
    tag = "posts",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching posts", body = PaginatedResponse<Post>)
    )
)]
pub async fn search_posts(
    State(state): State<AppState>,
    MaybeUser(principal): MaybeUser,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<PaginatedResponse<Post>>> {
    policy::require(principal.as_ref(), Action::View, EntityType::Post)?;

    let (posts, total) = state.services.blog.search(&query).await?;
    Ok(Json(PaginatedResponse::new(posts, total, query.page, query.per_page)))
}

#[utoipa::path(
    get,
    path = "/posts/{id}",
    tag = "posts",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post details", body = Post),
        (status = 404, description = "Post not found")
    )
)]
pub async fn get_post(
    State(state): State<AppState>,
    MaybeUser(principal): MaybeUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Post>> {
    policy::require(principal.as_ref(), Action::View, EntityType::Post)?;

    let post = state.services.blog.get_post(id).await?;
    Ok(Json(post))
}

/// Publish a post as the current user
#[utoipa::path(
    post,
    path = "/posts",
    tag = "posts",
    security(("bearer_auth" = [])),
    request_body = PostForm,
    responses(
        (status = 201, description = "Post created", body = Post),
        (status = 400, description = "Invalid post", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_post(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    body: JsonBody<PostForm>,
) -> AppResult<(StatusCode, Json<Post>)> {
    principal.require(Action::Create, EntityType::Post)?;
    let Json(form) = body?;

    let input = form.clean()?;
    let post = state.services.blog.create_post(&principal, &input).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// Update a post (author or admin)
#[utoipa::path(
    put,
    path = "/posts/{id}",
    tag = "posts",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Post ID")),
    request_body = PostForm,
    responses(
        (status = 200, description = "Post updated", body = Post),
        (status = 400, description = "Invalid post", body = crate::error::ErrorResponse),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn update_post(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
    body: JsonBody<PostForm>,
) -> AppResult<Json<Post>> {
    principal.require(Action::Edit, EntityType::Post)?;
    let Json(form) = body?;

    let input = form.clean()?;
    let post = state.services.blog.update_post(&principal, id, &input).await?;
    Ok(Json(post))
}

/// Delete a post (author or admin)
#[utoipa::path(
    delete,
    path = "/posts/{id}",
    tag = "posts",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn delete_post(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    principal.require(Action::Delete, EntityType::Post)?;

    state.services.blog.delete_post(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

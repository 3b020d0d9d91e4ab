//! Tag endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        enums::{Action, EntityType},
        post::{Post, PostQuery},
        tag::TagWithCount,
    },
    policy,
    AppState,
};

use super::{AuthenticatedUser, MaybeUser, PaginatedResponse};

/// All tags with their post counts
#[utoipa::path(
    get,
    path = "/tags",
    tag = "tags",
    responses(
        (status = 200, description = "Tags", body = Vec<TagWithCount>)
    )
)]
pub async fn list_tags(
    State(state): State<AppState>,
    MaybeUser(principal): MaybeUser,
) -> AppResult<Json<Vec<TagWithCount>>> {
    policy::require(principal.as_ref(), Action::View, EntityType::Tag)?;

    let tags = state.services.tags.list().await?;
    Ok(Json(tags))
}

/// Posts carrying a tag
#[utoipa::path(
    get,
    path = "/tags/{name}/posts",
    tag = "tags",
    params(
        ("name" = String, Path, description = "Tag name"),
        PostQuery
    ),
    responses(
        (status = 200, description = "Tagged posts", body = PaginatedResponse<Post>),
        (status = 404, description = "Tag not found")
    )
)]
pub async fn tag_posts(
    State(state): State<AppState>,
    MaybeUser(principal): MaybeUser,
    Path(name): Path<String>,
    Query(query): Query<PostQuery>,
) -> AppResult<Json<PaginatedResponse<Post>>> {
    policy::require(principal.as_ref(), Action::View, EntityType::Tag)?;
    policy::require(principal.as_ref(), Action::View, EntityType::Post)?;

    let (page, per_page) = (query.page, query.per_page);
    let (posts, total) = state.services.tags.posts_for(&name, query).await?;
    Ok(Json(PaginatedResponse::new(posts, total, page, per_page)))
}

/// Delete a tag; posts keep everything else
#[utoipa::path(
    delete,
    path = "/tags/{name}",
    tag = "tags",
    security(("bearer_auth" = [])),
    params(("name" = String, Path, description = "Tag name")),
    responses(
        (status = 204, description = "Tag deleted"),
        (status = 403, description = "Insufficient rights"),
        (status = 404, description = "Tag not found")
    )
)]
pub async fn delete_tag(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(name): Path<String>,
) -> AppResult<StatusCode> {
    principal.require(Action::Delete, EntityType::Tag)?;

    state.services.tags.delete(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

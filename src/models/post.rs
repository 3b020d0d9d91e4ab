//! Blog post model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Blog post with its author's username and tag names
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub author_id: i32,
    pub author_username: String,
    pub published_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Tag names, alphabetical
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PostShort {
    pub id: i32,
    pub title: String,
    pub author_username: String,
    pub published_at: DateTime<Utc>,
}

/// Post list query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct PostQuery {
    pub author_id: Option<i32>,
    /// Exact tag name
    pub tag: Option<String>,
    /// Substring of title, content or a tag name
    pub search: Option<String>,
    /// `published_at` or `title`, `-` prefix for descending (default `-published_at`)
    pub ordering: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Free-text search parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Create/update post request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PostForm {
    #[validate(length(min = 1, max = 200, message = "Title is required and must be at most 200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    /// Comma-separated tag names. Replaces the post's tags when present.
    pub tags: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostInput {
    pub title: String,
    pub content: String,
    /// `None` keeps the current tags on update
    pub tags: Option<Vec<String>>,
}

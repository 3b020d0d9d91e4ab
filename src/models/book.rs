//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::library::LibraryShort;

/// Full book model (joined with its author's name)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author_id: i32,
    pub author_name: String,
    pub isbn: String,
    pub publication_year: i32,
    pub description: String,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Libraries holding this book, loaded on detail requests only
    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub libraries: Option<Vec<LibraryShort>>,
}

/// Short book representation for nested lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookShort {
    pub id: i32,
    pub title: String,
    pub author_name: String,
    pub publication_year: i32,
    pub is_available: bool,
}

/// Book list query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    pub author_id: Option<i32>,
    pub publication_year: Option<i32>,
    pub publication_year_min: Option<i32>,
    pub publication_year_max: Option<i32>,
    pub is_available: Option<bool>,
    /// Substring of the title or the author's name
    pub search: Option<String>,
    /// `title`, `publication_year` or `created_at`, `-` prefix for descending
    pub ordering: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Create/update book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BookForm {
    #[validate(length(min = 1, max = 200, message = "Title is required and must be at most 200 characters"))]
    pub title: String,
    pub author_id: i32,
    pub isbn: Option<String>,
    /// Checked against `[1450, current year]` when cleaned
    pub publication_year: i32,
    pub description: Option<String>,
    pub is_available: Option<bool>,
}

/// Cleaned book record ready for persistence
#[derive(Debug, Clone, PartialEq)]
pub struct BookInput {
    pub title: String,
    pub author_id: i32,
    pub isbn: String,
    pub publication_year: i32,
    pub description: String,
    pub is_available: bool,
}

/// Placeholder body for the bulk endpoint
#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkBookRequest {
    pub operation: Option<String>,
    #[serde(default)]
    pub ids: Vec<i32>,
}

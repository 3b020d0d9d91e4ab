//! Library and librarian models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::book::BookShort;

/// Full library model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Library {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub phone_number: String,
    pub email: String,
    pub opening_hours: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub books: Option<Vec<BookShort>>,
    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub librarian: Option<Librarian>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LibraryShort {
    pub id: i32,
    pub name: String,
}

/// Library list query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct LibraryQuery {
    /// Substring of the name or address
    pub search: Option<String>,
    /// `name` or `created_at`, `-` prefix for descending
    pub ordering: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Create/update library request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LibraryForm {
    #[validate(length(min = 1, max = 100, message = "Name is required and must be at most 100 characters"))]
    pub name: String,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: Option<String>,
    pub opening_hours: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LibraryInput {
    pub name: String,
    pub address: String,
    pub phone_number: String,
    pub email: String,
    pub opening_hours: String,
}

/// Replace the set of books held by a library
#[derive(Debug, Deserialize, ToSchema)]
pub struct LibraryBooksRequest {
    pub book_ids: Vec<i32>,
}

// ---------------------------------------------------------------------------
// Librarian
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Librarian {
    pub id: i32,
    pub name: String,
    pub library_id: i32,
    pub library_name: String,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct LibrarianQuery {
    pub library_id: Option<i32>,
    pub search: Option<String>,
    /// `name`, `-` prefix for descending
    pub ordering: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LibrarianForm {
    #[validate(length(min = 1, max = 100, message = "Name is required and must be at most 100 characters"))]
    pub name: String,
    pub library_id: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LibrarianInput {
    pub name: String,
    pub library_id: i32,
}

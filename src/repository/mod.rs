//! Repository layer for database operations

pub mod authors;
pub mod books;
pub mod libraries;
pub mod posts;
pub mod tags;
pub mod users;

use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    forms::{sanitize_text, FieldErrors},
};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub authors: authors::AuthorsRepository,
    pub books: books::BooksRepository,
    pub libraries: libraries::LibrariesRepository,
    pub users: users::UsersRepository,
    pub posts: posts::PostsRepository,
    pub tags: tags::TagsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            authors: authors::AuthorsRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            libraries: libraries::LibrariesRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            posts: posts::PostsRepository::new(pool.clone()),
            tags: tags::TagsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Round-trip to the database, used by the readiness check
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

// =========================================================================
// Shared list helpers
// =========================================================================

pub const DEFAULT_PER_PAGE: i64 = 20;
pub const MAX_PER_PAGE: i64 = 100;

/// Resolved pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub per_page: i64,
}

impl Page {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    /// Saturates for absurd page numbers; such a page is simply empty
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// Turn an `ordering` parameter into an ORDER BY expression.
///
/// `allowed` maps public field names to column expressions; a leading `-`
/// means descending. Unknown fields are a validation error on `ordering`.
pub fn order_by(
    ordering: Option<&str>,
    allowed: &[(&str, &str)],
    default: &str,
) -> Result<String, FieldErrors> {
    let requested = ordering.map(str::trim).filter(|o| !o.is_empty()).unwrap_or(default);
    let (field, direction) = match requested.strip_prefix('-') {
        Some(field) => (field, "DESC"),
        None => (requested, "ASC"),
    };
    allowed
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, column)| format!("{} {}", column, direction))
        .ok_or_else(|| {
            let names: Vec<&str> = allowed.iter().map(|(name, _)| *name).collect();
            FieldErrors::single(
                "ordering",
                format!("Cannot order by '{}'. Choices are: {}", field, names.join(", ")),
            )
        })
}

/// Case-insensitive substring pattern for ILIKE with wildcards escaped.
/// The term is normalized like stored text so `O'Brien` finds `O&#x27;Brien`.
pub fn contains_pattern(term: &str) -> String {
    let escaped = sanitize_text(term)
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Non-empty, trimmed search term
pub fn search_term(term: Option<&str>) -> Option<&str> {
    term.map(str::trim).filter(|t| !t.is_empty())
}

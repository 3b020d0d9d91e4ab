//! Books repository for database operations

use sqlx::{Pool, Postgres, QueryBuilder};

use super::{contains_pattern, order_by, search_term, Page};
use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookInput, BookQuery, BookShort},
        library::LibraryShort,
    },
};

const ORDERING: &[(&str, &str)] = &[
    ("title", "b.title"),
    ("publication_year", "b.publication_year"),
    ("created_at", "b.created_at"),
    ("author", "a.name"),
];

const SELECT_BOOK: &str = r#"
    SELECT b.id, b.title, b.author_id, a.name AS author_name, b.isbn,
           b.publication_year, b.description, b.is_available,
           b.created_at, b.updated_at
    FROM books b
    JOIN authors a ON a.id = b.author_id
"#;

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &BookQuery) {
    if let Some(author_id) = query.author_id {
        qb.push(" AND b.author_id = ").push_bind(author_id);
    }
    if let Some(year) = query.publication_year {
        qb.push(" AND b.publication_year = ").push_bind(year);
    }
    if let Some(min) = query.publication_year_min {
        qb.push(" AND b.publication_year >= ").push_bind(min);
    }
    if let Some(max) = query.publication_year_max {
        qb.push(" AND b.publication_year <= ").push_bind(max);
    }
    if let Some(available) = query.is_available {
        qb.push(" AND b.is_available = ").push_bind(available);
    }
    if let Some(term) = search_term(query.search.as_deref()) {
        let pattern = contains_pattern(term);
        qb.push(" AND (b.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR a.name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // READ
    // =========================================================================

    /// Search books with filters, ordering and pagination
    pub async fn search(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        let order = order_by(query.ordering.as_deref(), ORDERING, "title")?;
        let page = Page::new(query.page, query.per_page);

        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM books b JOIN authors a ON a.id = b.author_id WHERE 1=1",
        );
        push_filters(&mut count, query);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(SELECT_BOOK);
        select.push(" WHERE 1=1");
        push_filters(&mut select, query);
        select
            .push(format!(" ORDER BY {}, b.id", order))
            .push(" LIMIT ")
            .push_bind(page.per_page)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let books = select.build_query_as::<Book>().fetch_all(&self.pool).await?;

        Ok((books, total))
    }

    /// Get book by ID with the libraries holding it
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        let mut book = sqlx::query_as::<_, Book>(&format!("{} WHERE b.id = $1", SELECT_BOOK))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let libraries = sqlx::query_as::<_, LibraryShort>(
            r#"
            SELECT l.id, l.name
            FROM library_books lb
            JOIN libraries l ON l.id = lb.library_id
            WHERE lb.book_id = $1
            ORDER BY l.name
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        book.libraries = Some(libraries);
        Ok(book)
    }

    /// Return the subset of `ids` that do not exist
    pub async fn missing_ids(&self, ids: &[i32]) -> AppResult<Vec<i32>> {
        let found: Vec<i32> = sqlx::query_scalar("SELECT id FROM books WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids.iter().copied().filter(|id| !found.contains(id)).collect())
    }

    // =========================================================================
    // WRITE
    // =========================================================================

    pub async fn create(&self, input: &BookInput) -> AppResult<Book> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO books (title, author_id, isbn, publication_year, description,
                               is_available, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, now(), now())
            RETURNING id
            "#,
        )
        .bind(&input.title)
        .bind(input.author_id)
        .bind(&input.isbn)
        .bind(input.publication_year)
        .bind(&input.description)
        .bind(input.is_available)
        .fetch_one(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    pub async fn update(&self, id: i32, input: &BookInput) -> AppResult<Book> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = $2, author_id = $3, isbn = $4, publication_year = $5,
                description = $6, is_available = $7, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&input.title)
        .bind(input.author_id)
        .bind(&input.isbn)
        .bind(input.publication_year)
        .bind(&input.description)
        .bind(input.is_available)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        self.get_by_id(id).await
    }

    /// Delete a book; library links are removed by cascade
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn recent(&self, limit: i64) -> AppResult<Vec<BookShort>> {
        let books = sqlx::query_as::<_, BookShort>(
            r#"
            SELECT b.id, b.title, a.name AS author_name, b.publication_year, b.is_available
            FROM books b
            JOIN authors a ON a.id = b.author_id
            ORDER BY b.created_at DESC, b.id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }
}

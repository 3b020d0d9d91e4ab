//! Authors repository for database operations

use sqlx::{Pool, Postgres, QueryBuilder};

use super::{contains_pattern, order_by, search_term, Page};
use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorInput, AuthorQuery, AuthorShort},
        book::BookShort,
    },
};

const ORDERING: &[(&str, &str)] = &[("name", "a.name"), ("created_at", "a.created_at")];

const SELECT_AUTHOR: &str = r#"
    SELECT a.id, a.name, a.bio, a.date_of_birth, a.date_of_death,
           (SELECT COUNT(*) FROM books b WHERE b.author_id = a.id) AS book_count,
           a.created_at, a.updated_at
    FROM authors a
"#;

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &AuthorQuery) {
    if let Some(name) = search_term(query.name.as_deref()) {
        qb.push(" AND a.name ILIKE ").push_bind(contains_pattern(name));
    }
    if let Some(term) = search_term(query.search.as_deref()) {
        qb.push(" AND a.name ILIKE ").push_bind(contains_pattern(term));
    }
}

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Postgres>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Search authors with pagination
    pub async fn search(&self, query: &AuthorQuery) -> AppResult<(Vec<Author>, i64)> {
        let order = order_by(query.ordering.as_deref(), ORDERING, "name")?;
        let page = Page::new(query.page, query.per_page);

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM authors a WHERE 1=1");
        push_filters(&mut count, query);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(SELECT_AUTHOR);
        select.push(" WHERE 1=1");
        push_filters(&mut select, query);
        select
            .push(format!(" ORDER BY {}, a.id", order))
            .push(" LIMIT ")
            .push_bind(page.per_page)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let authors = select.build_query_as::<Author>().fetch_all(&self.pool).await?;

        Ok((authors, total))
    }

    /// Get author by ID with its books
    pub async fn get_by_id(&self, id: i32) -> AppResult<Author> {
        let mut author = sqlx::query_as::<_, Author>(&format!("{} WHERE a.id = $1", SELECT_AUTHOR))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))?;

        author.books = Some(self.get_books(id).await?);
        Ok(author)
    }

    async fn get_books(&self, author_id: i32) -> AppResult<Vec<BookShort>> {
        let books = sqlx::query_as::<_, BookShort>(
            r#"
            SELECT b.id, b.title, a.name AS author_name, b.publication_year, b.is_available
            FROM books b
            JOIN authors a ON a.id = b.author_id
            WHERE b.author_id = $1
            ORDER BY b.publication_year, b.title
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    pub async fn exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM authors WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    pub async fn create(&self, input: &AuthorInput) -> AppResult<Author> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO authors (name, bio, date_of_birth, date_of_death, created_at, updated_at)
            VALUES ($1, $2, $3, $4, now(), now())
            RETURNING id
            "#,
        )
        .bind(&input.name)
        .bind(&input.bio)
        .bind(input.date_of_birth)
        .bind(input.date_of_death)
        .fetch_one(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    pub async fn update(&self, id: i32, input: &AuthorInput) -> AppResult<Author> {
        let result = sqlx::query(
            r#"
            UPDATE authors
            SET name = $2, bio = $3, date_of_birth = $4, date_of_death = $5, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.bio)
        .bind(input.date_of_birth)
        .bind(input.date_of_death)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author with id {} not found", id)));
        }
        self.get_by_id(id).await
    }

    /// Delete an author; its books go with it (ON DELETE CASCADE).
    /// Returns the number of books removed.
    pub async fn delete(&self, id: i32) -> AppResult<i64> {
        let mut tx = self.pool.begin().await?;

        let books: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE author_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author with id {} not found", id)));
        }

        tx.commit().await?;
        Ok(books)
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM authors")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn recent(&self, limit: i64) -> AppResult<Vec<AuthorShort>> {
        let authors = sqlx::query_as::<_, AuthorShort>(
            "SELECT id, name FROM authors ORDER BY created_at DESC, id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(authors)
    }
}

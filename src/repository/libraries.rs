//! Libraries and librarians repository

use sqlx::{Pool, Postgres, QueryBuilder};

use super::{contains_pattern, order_by, search_term, Page};
use crate::{
    error::{AppError, AppResult},
    models::{
        book::BookShort,
        library::{
            Librarian, LibrarianInput, LibrarianQuery, Library, LibraryInput, LibraryQuery,
            LibraryShort,
        },
    },
};

const LIBRARY_ORDERING: &[(&str, &str)] = &[("name", "l.name"), ("created_at", "l.created_at")];
const LIBRARIAN_ORDERING: &[(&str, &str)] = &[("name", "lr.name"), ("library", "l.name")];

const SELECT_LIBRARY: &str = r#"
    SELECT l.id, l.name, l.address, l.phone_number, l.email, l.opening_hours,
           l.created_at, l.updated_at
    FROM libraries l
"#;

const SELECT_LIBRARIAN: &str = r#"
    SELECT lr.id, lr.name, lr.library_id, l.name AS library_name
    FROM librarians lr
    JOIN libraries l ON l.id = lr.library_id
"#;

fn push_library_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &LibraryQuery) {
    if let Some(term) = search_term(query.search.as_deref()) {
        let pattern = contains_pattern(term);
        qb.push(" AND (l.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR l.address ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

fn push_librarian_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &LibrarianQuery) {
    if let Some(library_id) = query.library_id {
        qb.push(" AND lr.library_id = ").push_bind(library_id);
    }
    if let Some(term) = search_term(query.search.as_deref()) {
        qb.push(" AND lr.name ILIKE ").push_bind(contains_pattern(term));
    }
}

#[derive(Clone)]
pub struct LibrariesRepository {
    pool: Pool<Postgres>,
}

impl LibrariesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // LIBRARIES
    // =========================================================================

    pub async fn search(&self, query: &LibraryQuery) -> AppResult<(Vec<Library>, i64)> {
        let order = order_by(query.ordering.as_deref(), LIBRARY_ORDERING, "name")?;
        let page = Page::new(query.page, query.per_page);

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM libraries l WHERE 1=1");
        push_library_filters(&mut count, query);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(SELECT_LIBRARY);
        select.push(" WHERE 1=1");
        push_library_filters(&mut select, query);
        select
            .push(format!(" ORDER BY {}, l.id", order))
            .push(" LIMIT ")
            .push_bind(page.per_page)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let libraries = select.build_query_as::<Library>().fetch_all(&self.pool).await?;

        Ok((libraries, total))
    }

    /// Get library by ID with its books and librarian
    pub async fn get_by_id(&self, id: i32) -> AppResult<Library> {
        let mut library = sqlx::query_as::<_, Library>(&format!("{} WHERE l.id = $1", SELECT_LIBRARY))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Library with id {} not found", id)))?;

        library.books = Some(
            sqlx::query_as::<_, BookShort>(
                r#"
                SELECT b.id, b.title, a.name AS author_name, b.publication_year, b.is_available
                FROM library_books lb
                JOIN books b ON b.id = lb.book_id
                JOIN authors a ON a.id = b.author_id
                WHERE lb.library_id = $1
                ORDER BY b.title
                "#,
            )
            .bind(id)
            .fetch_all(&self.pool)
            .await?,
        );

        library.librarian = sqlx::query_as::<_, Librarian>(&format!(
            "{} WHERE lr.library_id = $1",
            SELECT_LIBRARIAN
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(library)
    }

    pub async fn exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM libraries WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    pub async fn create(&self, input: &LibraryInput) -> AppResult<Library> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO libraries (name, address, phone_number, email, opening_hours,
                                   created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, now(), now())
            RETURNING id
            "#,
        )
        .bind(&input.name)
        .bind(&input.address)
        .bind(&input.phone_number)
        .bind(&input.email)
        .bind(&input.opening_hours)
        .fetch_one(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    pub async fn update(&self, id: i32, input: &LibraryInput) -> AppResult<Library> {
        let result = sqlx::query(
            r#"
            UPDATE libraries
            SET name = $2, address = $3, phone_number = $4, email = $5, opening_hours = $6,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.address)
        .bind(&input.phone_number)
        .bind(&input.email)
        .bind(&input.opening_hours)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Library with id {} not found", id)));
        }
        self.get_by_id(id).await
    }

    /// Replace the library's book set in one transaction
    pub async fn set_books(&self, id: i32, book_ids: &[i32]) -> AppResult<Library> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM library_books WHERE library_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO library_books (library_id, book_id)
            SELECT $1, book_id FROM UNNEST($2::int4[]) AS t(book_id)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(id)
        .bind(book_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        self.get_by_id(id).await
    }

    /// Delete a library: book links and the librarian cascade, books stay
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM libraries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Library with id {} not found", id)));
        }
        Ok(())
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM libraries")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn recent(&self, limit: i64) -> AppResult<Vec<LibraryShort>> {
        let libraries = sqlx::query_as::<_, LibraryShort>(
            "SELECT id, name FROM libraries ORDER BY created_at DESC, id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(libraries)
    }

    // =========================================================================
    // LIBRARIANS
    // =========================================================================

    pub async fn search_librarians(&self, query: &LibrarianQuery) -> AppResult<(Vec<Librarian>, i64)> {
        let order = order_by(query.ordering.as_deref(), LIBRARIAN_ORDERING, "name")?;
        let page = Page::new(query.page, query.per_page);

        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM librarians lr JOIN libraries l ON l.id = lr.library_id WHERE 1=1",
        );
        push_librarian_filters(&mut count, query);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(SELECT_LIBRARIAN);
        select.push(" WHERE 1=1");
        push_librarian_filters(&mut select, query);
        select
            .push(format!(" ORDER BY {}, lr.id", order))
            .push(" LIMIT ")
            .push_bind(page.per_page)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let librarians = select.build_query_as::<Librarian>().fetch_all(&self.pool).await?;

        Ok((librarians, total))
    }

    pub async fn get_librarian(&self, id: i32) -> AppResult<Librarian> {
        sqlx::query_as::<_, Librarian>(&format!("{} WHERE lr.id = $1", SELECT_LIBRARIAN))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Librarian with id {} not found", id)))
    }

    /// Fails with a `library_id` validation error if the library is already staffed
    pub async fn create_librarian(&self, input: &LibrarianInput) -> AppResult<Librarian> {
        let id: i32 = sqlx::query_scalar(
            "INSERT INTO librarians (name, library_id) VALUES ($1, $2) RETURNING id",
        )
        .bind(&input.name)
        .bind(input.library_id)
        .fetch_one(&self.pool)
        .await?;

        self.get_librarian(id).await
    }

    pub async fn update_librarian(&self, id: i32, input: &LibrarianInput) -> AppResult<Librarian> {
        let result = sqlx::query("UPDATE librarians SET name = $2, library_id = $3 WHERE id = $1")
            .bind(id)
            .bind(&input.name)
            .bind(input.library_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Librarian with id {} not found", id)));
        }
        self.get_librarian(id).await
    }

    pub async fn delete_librarian(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM librarians WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Librarian with id {} not found", id)));
        }
        Ok(())
    }
}

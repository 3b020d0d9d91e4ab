//! Posts repository for database operations

use sqlx::{PgConnection, Pool, Postgres, QueryBuilder};

use super::{contains_pattern, order_by, search_term, Page};
use crate::{
    error::{AppError, AppResult},
    forms::sanitize_text,
    models::post::{Post, PostInput, PostQuery, PostShort},
};

const ORDERING: &[(&str, &str)] = &[("published_at", "p.published_at"), ("title", "p.title")];

const SELECT_POST: &str = r#"
    SELECT p.id, p.title, p.content, p.author_id, u.username AS author_username,
           p.published_at, p.updated_at,
           ARRAY(
               SELECT t.name::text FROM post_tags pt
               JOIN tags t ON t.id = pt.tag_id
               WHERE pt.post_id = p.id
               ORDER BY t.name
           ) AS tags
    FROM posts p
    JOIN users u ON u.id = p.author_id
"#;

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &PostQuery) {
    if let Some(author_id) = query.author_id {
        qb.push(" AND p.author_id = ").push_bind(author_id);
    }
    if let Some(tag) = search_term(query.tag.as_deref()) {
        qb.push(
            " AND EXISTS (SELECT 1 FROM post_tags pt JOIN tags t ON t.id = pt.tag_id \
             WHERE pt.post_id = p.id AND t.name = ",
        )
        .push_bind(sanitize_text(tag))
        .push(")");
    }
    if let Some(term) = search_term(query.search.as_deref()) {
        push_search(qb, term);
    }
}

/// Match `term` against title, content or any tag name of the post
fn push_search(qb: &mut QueryBuilder<'_, Postgres>, term: &str) {
    let pattern = contains_pattern(term);
    qb.push(" AND (p.title ILIKE ")
        .push_bind(pattern.clone())
        .push(" OR p.content ILIKE ")
        .push_bind(pattern.clone())
        .push(
            " OR EXISTS (SELECT 1 FROM post_tags pt JOIN tags t ON t.id = pt.tag_id \
             WHERE pt.post_id = p.id AND t.name ILIKE ",
        )
        .push_bind(pattern)
        .push("))");
}

#[derive(Clone)]
pub struct PostsRepository {
    pool: Pool<Postgres>,
}

impl PostsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Search posts with filters, ordering and pagination
    pub async fn search(&self, query: &PostQuery) -> AppResult<(Vec<Post>, i64)> {
        let order = order_by(query.ordering.as_deref(), ORDERING, "-published_at")?;
        let page = Page::new(query.page, query.per_page);

        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM posts p JOIN users u ON u.id = p.author_id WHERE 1=1",
        );
        push_filters(&mut count, query);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(SELECT_POST);
        select.push(" WHERE 1=1");
        push_filters(&mut select, query);
        select
            .push(format!(" ORDER BY {}, p.id DESC", order))
            .push(" LIMIT ")
            .push_bind(page.per_page)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let posts = select.build_query_as::<Post>().fetch_all(&self.pool).await?;

        Ok((posts, total))
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Post> {
        sqlx::query_as::<_, Post>(&format!("{} WHERE p.id = $1", SELECT_POST))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post with id {} not found", id)))
    }

    /// Author of a post, used for ownership checks
    pub async fn get_owner(&self, id: i32) -> AppResult<i32> {
        sqlx::query_scalar::<_, i32>("SELECT author_id FROM posts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post with id {} not found", id)))
    }

    pub async fn insert(conn: &mut PgConnection, author_id: i32, input: &PostInput) -> AppResult<i32> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO posts (title, content, author_id, published_at, updated_at)
            VALUES ($1, $2, $3, now(), now())
            RETURNING id
            "#,
        )
        .bind(&input.title)
        .bind(&input.content)
        .bind(author_id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(id)
    }

    pub async fn update(conn: &mut PgConnection, id: i32, input: &PostInput) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE posts SET title = $2, content = $3, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(&input.title)
        .bind(&input.content)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Post with id {} not found", id)));
        }
        Ok(())
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Post with id {} not found", id)));
        }
        Ok(())
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn recent(&self, limit: i64) -> AppResult<Vec<PostShort>> {
        let posts = sqlx::query_as::<_, PostShort>(
            r#"
            SELECT p.id, p.title, u.username AS author_username, p.published_at
            FROM posts p
            JOIN users u ON u.id = p.author_id
            ORDER BY p.published_at DESC, p.id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }
}

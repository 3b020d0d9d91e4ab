//! Tags repository

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    forms::sanitize_text,
    models::tag::{Tag, TagWithCount},
};

#[derive(Clone)]
pub struct TagsRepository {
    pool: Pool<Postgres>,
}

impl TagsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// All tags with the number of posts using them
    pub async fn list_with_counts(&self) -> AppResult<Vec<TagWithCount>> {
        let tags = sqlx::query_as::<_, TagWithCount>(
            r#"
            SELECT t.id, t.name, COUNT(pt.post_id) AS post_count
            FROM tags t
            LEFT JOIN post_tags pt ON pt.tag_id = t.id
            GROUP BY t.id, t.name
            ORDER BY t.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(tags)
    }

    /// Look a tag up by name as typed; the name is escaped like stored tags
    pub async fn get_by_name(&self, name: &str) -> AppResult<Tag> {
        sqlx::query_as::<_, Tag>("SELECT id, name FROM tags WHERE name = $1")
            .bind(sanitize_text(name))
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tag '{}' not found", name)))
    }

    /// Delete a tag by name; posts lose the tag
    pub async fn delete(&self, name: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM tags WHERE name = $1")
            .bind(sanitize_text(name))
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Tag '{}' not found", name)));
        }
        Ok(())
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tags")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Get or create every tag in `names`, returned in the order given.
    /// Concurrent callers creating the same name both end up with the one row.
    pub async fn ensure(conn: &mut PgConnection, names: &[String]) -> AppResult<Vec<Tag>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query(
            r#"
            INSERT INTO tags (name)
            SELECT name FROM UNNEST($1::text[]) AS t(name)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(names)
        .execute(&mut *conn)
        .await?;

        let found = sqlx::query_as::<_, Tag>("SELECT id, name FROM tags WHERE name = ANY($1)")
            .bind(names)
            .fetch_all(&mut *conn)
            .await?;

        Ok(names
            .iter()
            .filter_map(|name| found.iter().find(|t| &t.name == name).cloned())
            .collect())
    }

    /// Make `tag_ids` the exact tag set of a post
    pub async fn replace_post_tags(
        conn: &mut PgConnection,
        post_id: i32,
        tag_ids: &[i32],
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM post_tags WHERE post_id = $1")
            .bind(post_id)
            .execute(&mut *conn)
            .await?;

        if !tag_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO post_tags (post_id, tag_id)
                SELECT $1, tag_id FROM UNNEST($2::int4[]) AS t(tag_id)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(post_id)
            .bind(tag_ids)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }
}

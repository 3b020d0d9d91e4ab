//! Users repository for database operations

use sqlx::{Pool, Postgres, QueryBuilder};

use super::{contains_pattern, order_by, search_term, Page};
use crate::{
    error::{AppError, AppResult},
    models::{
        enums::Role,
        user::{Account, AccountRow, NewAccount, ProfileUpdate, UserCredentials, UserQuery, UserStatus},
    },
};

const ORDERING: &[(&str, &str)] = &[
    ("username", "u.username"),
    ("date_joined", "u.date_joined"),
    ("role", "p.role"),
];

const SELECT_ACCOUNT: &str = r#"
    SELECT u.id, u.username, u.email, u.first_name, u.last_name, u.is_active,
           u.date_joined, p.role, p.bio, p.website
    FROM users u
    LEFT JOIN profiles p ON p.user_id = u.id
"#;

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &UserQuery) {
    if let Some(role) = query.role {
        qb.push(" AND p.role = ").push_bind(role.as_str());
    }
    if let Some(term) = search_term(query.search.as_deref()) {
        let pattern = contains_pattern(term);
        qb.push(" AND (u.username ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR u.email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get login credentials by username (case-insensitive)
    pub async fn get_credentials(&self, username: &str) -> AppResult<Option<UserCredentials>> {
        let credentials = sqlx::query_as::<_, UserCredentials>(
            r#"
            SELECT u.id, u.username, u.password, u.is_active, p.role
            FROM users u
            LEFT JOIN profiles p ON p.user_id = u.id
            WHERE LOWER(u.username) = LOWER($1)
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(credentials)
    }

    /// Current active flag and role of a token's owner
    pub async fn get_status(&self, id: i32) -> AppResult<Option<UserStatus>> {
        let status = sqlx::query_as::<_, UserStatus>(
            r#"
            SELECT u.id, u.username, u.is_active, p.role
            FROM users u
            LEFT JOIN profiles p ON p.user_id = u.id
            WHERE u.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(status)
    }

    /// Check if username already exists
    pub async fn username_exists(&self, username: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(username) = LOWER($1))")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Create a user and its Member profile in one transaction.
    /// `password_hash` must already be hashed.
    pub async fn create(&self, account: &NewAccount, password_hash: &str) -> AppResult<Account> {
        let mut tx = self.pool.begin().await?;

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO users (username, email, password, is_active, date_joined)
            VALUES ($1, $2, $3, TRUE, now())
            RETURNING id
            "#,
        )
        .bind(&account.username)
        .bind(&account.email)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO profiles (user_id, role) VALUES ($1, $2)")
            .bind(id)
            .bind(Role::default().as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        self.get_by_id(id).await
    }

    /// Get user with profile by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Account> {
        let row = sqlx::query_as::<_, AccountRow>(&format!("{} WHERE u.id = $1", SELECT_ACCOUNT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))?;

        Ok(row.into())
    }

    /// Search users with pagination
    pub async fn search(&self, query: &UserQuery) -> AppResult<(Vec<Account>, i64)> {
        let order = order_by(query.ordering.as_deref(), ORDERING, "username")?;
        let page = Page::new(query.page, query.per_page);

        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM users u LEFT JOIN profiles p ON p.user_id = u.id WHERE 1=1",
        );
        push_filters(&mut count, query);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(SELECT_ACCOUNT);
        select.push(" WHERE 1=1");
        push_filters(&mut select, query);
        select
            .push(format!(" ORDER BY {}, u.id", order))
            .push(" LIMIT ")
            .push_bind(page.per_page)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let rows = select.build_query_as::<AccountRow>().fetch_all(&self.pool).await?;

        Ok((rows.into_iter().map(Account::from).collect(), total))
    }

    /// Update own profile; `None` fields are left untouched.
    /// A missing profile row is created with the default role.
    pub async fn update_profile(&self, id: i32, update: &ProfileUpdate) -> AppResult<Account> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE users
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.email)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }

        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, role, bio, website)
            VALUES ($1, $2, COALESCE($3, ''), COALESCE($4, ''))
            ON CONFLICT (user_id) DO UPDATE
            SET bio = COALESCE($3, profiles.bio),
                website = COALESCE($4, profiles.website)
            "#,
        )
        .bind(id)
        .bind(Role::default().as_str())
        .bind(&update.bio)
        .bind(&update.website)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        self.get_by_id(id).await
    }

    /// Set a user's role, creating the profile if it is missing
    pub async fn set_role(&self, id: i32, role: Role) -> AppResult<Account> {
        let result = sqlx::query(
            r#"
            INSERT INTO profiles (user_id, role)
            SELECT id, $2 FROM users WHERE id = $1
            ON CONFLICT (user_id) DO UPDATE SET role = EXCLUDED.role
            "#,
        )
        .bind(id)
        .bind(role.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }
        self.get_by_id(id).await
    }

    /// Delete a user; profile and posts cascade
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }
        Ok(())
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

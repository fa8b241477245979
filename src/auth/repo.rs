use anyhow::Context;
use sqlx::PgPool;

use crate::auth::repo_types::User;

impl User {
    /// Find a user by username.
    pub async fn find_by_username(db: &PgPool, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await
        .context("find user by username")?;
        Ok(user)
    }

    /// Create a new user. Returns `None` when the username is already taken.
    pub async fn create(
        db: &PgPool,
        username: &str,
        password_hash: &str,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            ON CONFLICT (username) DO NOTHING
            RETURNING id, username, password_hash
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_optional(db)
        .await
        .context("create user")?;
        Ok(user)
    }

    /// Delete a user together with all of their habits. Returns the number
    /// of user rows removed.
    pub async fn delete_cascade(db: &PgPool, user_id: i64) -> anyhow::Result<u64> {
        let mut tx = db.begin().await.context("begin tx")?;

        sqlx::query("DELETE FROM habits WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .context("delete habits of user")?;

        let removed = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .context("delete user")?
            .rows_affected();

        tx.commit().await.context("commit tx")?;
        Ok(removed)
    }
}

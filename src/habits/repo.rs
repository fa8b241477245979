use anyhow::Context;
use sqlx::PgPool;
use time::Date;

use crate::habits::repo_types::{Habit, NewHabit};

impl Habit {
    pub async fn create(db: &PgPool, new: &NewHabit) -> anyhow::Result<Habit> {
        let habit = sqlx::query_as::<_, Habit>(
            r#"
            INSERT INTO habits (name, description, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, user_id, created_at, last_done_date, days_completed
            "#,
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.user_id)
        .fetch_one(db)
        .await
        .context("insert habit")?;
        Ok(habit)
    }

    /// All habits of `user_id`, ordered by stable id.
    pub async fn list_by_user(db: &PgPool, user_id: i64) -> anyhow::Result<Vec<Habit>> {
        let rows = sqlx::query_as::<_, Habit>(
            r#"
            SELECT id, name, description, user_id, created_at, last_done_date, days_completed
              FROM habits
             WHERE user_id = $1
             ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
        .context("list habits")?;
        Ok(rows)
    }

    /// Habits of `user_id` not yet completed on `today`, ordered by stable id.
    pub async fn list_due(db: &PgPool, user_id: i64, today: Date) -> anyhow::Result<Vec<Habit>> {
        let rows = sqlx::query_as::<_, Habit>(
            r#"
            SELECT id, name, description, user_id, created_at, last_done_date, days_completed
              FROM habits
             WHERE user_id = $1
               AND (last_done_date IS NULL OR last_done_date < $2)
             ORDER BY id
            "#,
        )
        .bind(user_id)
        .bind(today)
        .fetch_all(db)
        .await
        .context("list habits due today")?;
        Ok(rows)
    }

    /// Returns the number of rows updated.
    pub async fn update_completion(
        db: &PgPool,
        habit_id: i64,
        user_id: i64,
        today: Date,
        days_completed: i32,
    ) -> anyhow::Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE habits
               SET last_done_date = $1, days_completed = $2
             WHERE id = $3 AND user_id = $4
            "#,
        )
        .bind(today)
        .bind(days_completed)
        .bind(habit_id)
        .bind(user_id)
        .execute(db)
        .await
        .context("update habit completion")?;
        Ok(result.rows_affected())
    }

    /// Returns the number of rows deleted; zero when the habit is missing or
    /// belongs to someone else.
    pub async fn delete(db: &PgPool, habit_id: i64, user_id: i64) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM habits WHERE id = $1 AND user_id = $2")
            .bind(habit_id)
            .bind(user_id)
            .execute(db)
            .await
            .context("delete habit")?;
        Ok(result.rows_affected())
    }
}

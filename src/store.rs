use async_trait::async_trait;
use sqlx::PgPool;
use time::Date;

use crate::auth::repo_types::User;
use crate::habits::repo_types::{Habit, NewHabit};

/// Persistence seam between the services and the database.
///
/// Mutating calls that target one row return the affected-row count; the
/// services decide what zero means.
#[async_trait]
pub trait HabitStore: Send + Sync {
    /// `None` when the username is already taken.
    async fn create_user(&self, username: &str, password_hash: &str)
        -> anyhow::Result<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;
    async fn delete_user(&self, user_id: i64) -> anyhow::Result<u64>;

    async fn create_habit(&self, new: &NewHabit) -> anyhow::Result<Habit>;
    async fn list_habits(&self, user_id: i64) -> anyhow::Result<Vec<Habit>>;
    async fn list_due_today(&self, user_id: i64, today: Date) -> anyhow::Result<Vec<Habit>>;
    async fn update_habit_completion(
        &self,
        habit_id: i64,
        user_id: i64,
        today: Date,
        days_completed: i32,
    ) -> anyhow::Result<u64>;
    async fn delete_habit(&self, habit_id: i64, user_id: i64) -> anyhow::Result<u64>;
}

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl HabitStore for PgStore {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> anyhow::Result<Option<User>> {
        User::create(&self.db, username, password_hash).await
    }

    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        User::find_by_username(&self.db, username).await
    }

    async fn delete_user(&self, user_id: i64) -> anyhow::Result<u64> {
        User::delete_cascade(&self.db, user_id).await
    }

    async fn create_habit(&self, new: &NewHabit) -> anyhow::Result<Habit> {
        Habit::create(&self.db, new).await
    }

    async fn list_habits(&self, user_id: i64) -> anyhow::Result<Vec<Habit>> {
        Habit::list_by_user(&self.db, user_id).await
    }

    async fn list_due_today(&self, user_id: i64, today: Date) -> anyhow::Result<Vec<Habit>> {
        Habit::list_due(&self.db, user_id, today).await
    }

    async fn update_habit_completion(
        &self,
        habit_id: i64,
        user_id: i64,
        today: Date,
        days_completed: i32,
    ) -> anyhow::Result<u64> {
        Habit::update_completion(&self.db, habit_id, user_id, today, days_completed).await
    }

    async fn delete_habit(&self, habit_id: i64, user_id: i64) -> anyhow::Result<u64> {
        Habit::delete(&self.db, habit_id, user_id).await
    }
}

#[cfg(test)]
pub use memory::MemoryStore;

#[cfg(test)]
mod memory {
    use std::sync::Mutex;

    use super::*;
    use time::OffsetDateTime;

    #[derive(Default)]
    struct Tables {
        next_user_id: i64,
        next_habit_id: i64,
        users: Vec<User>,
        habits: Vec<Habit>,
    }

    /// In-process stand-in for Postgres with the same ordering and
    /// ownership rules as the SQL queries.
    #[derive(Default)]
    pub struct MemoryStore {
        tables: Mutex<Tables>,
        fail: Mutex<bool>,
    }

    impl MemoryStore {
        /// Make every following call fail as if the database went away.
        pub fn fail_all(&self) {
            *self.fail.lock().unwrap() = true;
        }

        pub fn user_count(&self) -> usize {
            self.tables.lock().unwrap().users.len()
        }

        pub fn habit(&self, habit_id: i64) -> Option<Habit> {
            let t = self.tables.lock().unwrap();
            t.habits.iter().find(|h| h.id == habit_id).cloned()
        }

        /// Backdate a completion, e.g. to simulate "done yesterday".
        pub fn set_last_done(&self, habit_id: i64, date: Option<Date>) {
            let mut t = self.tables.lock().unwrap();
            if let Some(h) = t.habits.iter_mut().find(|h| h.id == habit_id) {
                h.last_done_date = date;
            }
        }

        fn tables(&self) -> anyhow::Result<std::sync::MutexGuard<'_, Tables>> {
            if *self.fail.lock().unwrap() {
                anyhow::bail!("connection refused");
            }
            Ok(self.tables.lock().unwrap())
        }
    }

    fn by_owner(habits: &[Habit], user_id: i64, mut keep: impl FnMut(&Habit) -> bool) -> Vec<Habit> {
        let mut rows: Vec<Habit> = habits
            .iter()
            .filter(|h| h.user_id == user_id && keep(*h))
            .cloned()
            .collect();
        rows.sort_by_key(|h| h.id);
        rows
    }

    #[async_trait]
    impl HabitStore for MemoryStore {
        async fn create_user(
            &self,
            username: &str,
            password_hash: &str,
        ) -> anyhow::Result<Option<User>> {
            let mut t = self.tables()?;
            if t.users.iter().any(|u| u.username == username) {
                return Ok(None);
            }
            t.next_user_id += 1;
            let user = User {
                id: t.next_user_id,
                username: username.to_string(),
                password_hash: password_hash.to_string(),
            };
            t.users.push(user.clone());
            Ok(Some(user))
        }

        async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
            let t = self.tables()?;
            Ok(t.users.iter().find(|u| u.username == username).cloned())
        }

        async fn delete_user(&self, user_id: i64) -> anyhow::Result<u64> {
            let mut t = self.tables()?;
            t.habits.retain(|h| h.user_id != user_id);
            let before = t.users.len();
            t.users.retain(|u| u.id != user_id);
            Ok((before - t.users.len()) as u64)
        }

        async fn create_habit(&self, new: &NewHabit) -> anyhow::Result<Habit> {
            let mut t = self.tables()?;
            anyhow::ensure!(
                t.users.iter().any(|u| u.id == new.user_id),
                "habits_user_id_fkey violated"
            );
            t.next_habit_id += 1;
            let habit = Habit {
                id: t.next_habit_id,
                name: new.name.clone(),
                description: new.description.clone(),
                user_id: new.user_id,
                created_at: OffsetDateTime::now_utc(),
                last_done_date: None,
                days_completed: 0,
            };
            t.habits.push(habit.clone());
            Ok(habit)
        }

        async fn list_habits(&self, user_id: i64) -> anyhow::Result<Vec<Habit>> {
            let t = self.tables()?;
            Ok(by_owner(&t.habits, user_id, |_| true))
        }

        async fn list_due_today(&self, user_id: i64, today: Date) -> anyhow::Result<Vec<Habit>> {
            let t = self.tables()?;
            Ok(by_owner(&t.habits, user_id, |h| h.is_due_on(today)))
        }

        async fn update_habit_completion(
            &self,
            habit_id: i64,
            user_id: i64,
            today: Date,
            days_completed: i32,
        ) -> anyhow::Result<u64> {
            let mut t = self.tables()?;
            match t
                .habits
                .iter_mut()
                .find(|h| h.id == habit_id && h.user_id == user_id)
            {
                Some(h) => {
                    h.last_done_date = Some(today);
                    h.days_completed = days_completed;
                    Ok(1)
                }
                None => Ok(0),
            }
        }

        async fn delete_habit(&self, habit_id: i64, user_id: i64) -> anyhow::Result<u64> {
            let mut t = self.tables()?;
            let before = t.habits.len();
            t.habits.retain(|h| !(h.id == habit_id && h.user_id == user_id));
            Ok((before - t.habits.len()) as u64)
        }
    }
}

use sqlx::FromRow;
use time::{Date, OffsetDateTime};

/// Habit row as stored. Display ids are never persisted; see `display.rs`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Habit {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub user_id: i64,
    pub created_at: OffsetDateTime,
    pub last_done_date: Option<Date>, // NULL until first completion
    pub days_completed: i32,
}

impl Habit {
    /// Due iff never completed or last completed before `today`.
    pub fn is_due_on(&self, today: Date) -> bool {
        match self.last_done_date {
            None => true,
            Some(done) => done < today,
        }
    }
}

/// Fields supplied by the operator when adding a habit.
#[derive(Debug, Clone)]
pub struct NewHabit {
    pub name: String,
    pub description: String,
    pub user_id: i64,
}

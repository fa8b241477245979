use tracing::{debug, info, instrument};

use crate::error::AppError;
use crate::habits::display::ListedHabit;
use crate::habits::repo_types::{Habit, NewHabit};
use crate::session::Session;
use crate::state::AppState;

#[instrument(skip(state, session, description))]
pub async fn add_habit(
    state: &AppState,
    session: &Session,
    name: &str,
    description: &str,
) -> Result<Habit, AppError> {
    let user_id = session.require_user()?.id;

    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("habit name must not be empty".into()));
    }

    let habit = state
        .store
        .create_habit(&NewHabit {
            name: name.to_string(),
            description: description.trim().to_string(),
            user_id,
        })
        .await?;

    info!(user_id, habit_id = habit.id, "habit added");
    Ok(habit)
}

/// Fetches the user's habits and renumbers them for display.
#[instrument(skip(state, session))]
pub async fn list_habits(
    state: &AppState,
    session: &mut Session,
) -> Result<Vec<ListedHabit>, AppError> {
    let user_id = session.require_user()?.id;
    let habits = state.store.list_habits(user_id).await?;
    debug!(user_id, count = habits.len(), "habits listed");
    Ok(session.display_ids.refresh(habits))
}

/// Habits not yet completed today, by ascending stable id.
#[instrument(skip(state, session))]
pub async fn due_today(state: &AppState, session: &Session) -> Result<Vec<Habit>, AppError> {
    let user_id = session.require_user()?.id;
    let today = state.clock.today();
    let habits = state.store.list_due_today(user_id, today).await?;
    debug!(user_id, %today, count = habits.len(), "habits due today");
    Ok(habits)
}

/// Stamps `habit` as done today and bumps its counter.
///
/// The new count is derived from `habit` as the caller last fetched it,
/// not from a fresh read. Repeated calls on the same day each count.
#[instrument(skip(state, session, habit), fields(habit_id = habit.id))]
pub async fn mark_done(
    state: &AppState,
    session: &Session,
    habit: &Habit,
) -> Result<Habit, AppError> {
    let user_id = session.require_user()?.id;
    let today = state.clock.today();
    let Some(days_completed) = habit.days_completed.checked_add(1) else {
        return Err(AppError::Validation(format!(
            "habit '{}' cannot be counted any higher",
            habit.name
        )));
    };

    let updated = state
        .store
        .update_habit_completion(habit.id, user_id, today, days_completed)
        .await?;
    if updated == 0 {
        return Err(AppError::NotFound("habit"));
    }

    info!(user_id, habit_id = habit.id, days_completed, "habit marked done");
    Ok(Habit {
        last_done_date: Some(today),
        days_completed,
        ..habit.clone()
    })
}

/// Deletes the habit the operator knows as `display_id`.
#[instrument(skip(state, session))]
pub async fn delete_habit(
    state: &AppState,
    session: &Session,
    display_id: u32,
) -> Result<(), AppError> {
    let user_id = session.require_user()?.id;

    // Unmapped numbers still go to storage as id 0, which no row has, so
    // the affected-row count is the only existence check.
    let habit_id = session.display_ids.resolve_display(display_id).unwrap_or(0);

    if state.store.delete_habit(habit_id, user_id).await? == 0 {
        return Err(AppError::NotFound("habit"));
    }

    info!(user_id, habit_id, display_id, "habit deleted");
    Ok(())
}

pub fn parse_display_id(input: &str) -> Result<u32, AppError> {
    input
        .trim()
        .parse::<u32>()
        .map_err(|e| AppError::Validation(format!("invalid habit ID '{}': {e}", input.trim())))
}

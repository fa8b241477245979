//! Per-listing display numbers for habits.
//!
//! Stable ids come from a database sequence and develop gaps after deletes,
//! so the operator refers to habits by their 1-based position in the most
//! recent listing instead. The numbers live only in the session; they are
//! overwritten on every listing and never written to storage.

use std::collections::HashMap;

use crate::habits::repo_types::Habit;

/// A habit paired with the number it was listed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedHabit {
    pub display_id: u32,
    pub habit: Habit,
}

#[derive(Debug, Default, Clone)]
pub struct DisplayIds {
    to_stable: HashMap<u32, i64>,
    to_display: HashMap<i64, u32>,
}

impl DisplayIds {
    /// Numbers `habits` 1..=N in the order given (storage returns them by
    /// ascending stable id) and records both directions.
    ///
    /// Entries are overwritten key by key and never purged, so after a
    /// delete the tables may still hold numbers for rows that are gone.
    /// Callers only use them to pick an id to send to storage, which
    /// remains the authority on whether the row exists.
    pub fn refresh(&mut self, habits: Vec<Habit>) -> Vec<ListedHabit> {
        habits
            .into_iter()
            .zip(1u32..)
            .map(|(habit, display_id)| {
                self.to_stable.insert(display_id, habit.id);
                self.to_display.insert(habit.id, display_id);
                ListedHabit { display_id, habit }
            })
            .collect()
    }

    pub fn resolve_display(&self, display_id: u32) -> Option<i64> {
        self.to_stable.get(&display_id).copied()
    }

    pub fn display_of(&self, habit_id: i64) -> Option<u32> {
        self.to_display.get(&habit_id).copied()
    }

    pub fn clear(&mut self) {
        self.to_stable.clear();
        self.to_display.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn habits(ids: &[i64]) -> Vec<Habit> {
        ids.iter()
            .map(|&id| Habit {
                id,
                name: format!("habit {id}"),
                description: String::new(),
                user_id: 7,
                created_at: datetime!(2024-01-01 00:00 UTC),
                last_done_date: None,
                days_completed: 0,
            })
            .collect()
    }

    #[test]
    fn numbers_follow_listing_order_from_one() {
        let mut ids = DisplayIds::default();
        let listed = ids.refresh(habits(&[3, 8, 42]));

        let numbers: Vec<(u32, i64)> = listed.iter().map(|l| (l.display_id, l.habit.id)).collect();
        assert_eq!(numbers, vec![(1, 3), (2, 8), (3, 42)]);

        assert_eq!(ids.resolve_display(2), Some(8));
        assert_eq!(ids.display_of(42), Some(3));
        assert_eq!(ids.resolve_display(4), None);
    }

    #[test]
    fn empty_listing_assigns_nothing() {
        let mut ids = DisplayIds::default();
        assert!(ids.refresh(Vec::new()).is_empty());
        assert_eq!(ids.resolve_display(1), None);
    }

    #[test]
    fn refresh_after_delete_renumbers_without_purging() {
        let mut ids = DisplayIds::default();
        ids.refresh(habits(&[3, 8, 42]));

        // habit 3 deleted; 8 and 42 shift down
        let listed = ids.refresh(habits(&[8, 42]));
        assert_eq!(listed[0].display_id, 1);
        assert_eq!(ids.resolve_display(1), Some(8));
        assert_eq!(ids.resolve_display(2), Some(42));

        // number 3 and the reverse entry for habit 3 are left dangling
        assert_eq!(ids.resolve_display(3), Some(42));
        assert_eq!(ids.display_of(3), Some(1));
        assert_eq!(ids.display_of(42), Some(2));
    }

    #[test]
    fn clear_forgets_both_directions() {
        let mut ids = DisplayIds::default();
        ids.refresh(habits(&[5]));
        ids.clear();
        assert_eq!(ids.resolve_display(1), None);
        assert_eq!(ids.display_of(5), None);
    }
}

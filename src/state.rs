use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::db;
use crate::store::{HabitStore, PgStore};

/// Process-wide collaborators shared by every session.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn HabitStore>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub async fn init(config: &AppConfig, clock: SystemClock) -> anyhow::Result<Self> {
        let pool = db::connect(config).await?;
        db::migrate(&pool).await;

        Ok(Self::from_parts(
            Arc::new(PgStore::new(pool)),
            Arc::new(clock),
        ))
    }

    pub fn from_parts(store: Arc<dyn HabitStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// In-memory store and a fixed "today" for tests.
    #[cfg(test)]
    pub fn fake(today: time::Date) -> (Self, Arc<crate::store::MemoryStore>) {
        let store = Arc::new(crate::store::MemoryStore::default());
        let state = Self::from_parts(store.clone(), Arc::new(crate::clock::FixedClock(today)));
        (state, store)
    }
}

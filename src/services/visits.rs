//! Per-session visit counter shown on the home page

use std::sync::Arc;

use super::sessions::SessionStore;
use crate::error::AppResult;

pub const NUM_VISITS_KEY: &str = "num_visits";

#[derive(Clone)]
pub struct VisitCounterService {
    store: Arc<dyn SessionStore>,
}

impl VisitCounterService {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Count a visit and return how many visits the session had before it.
    /// A missing or unreadable counter starts at 0.
    pub async fn record_visit(&self, session_id: &str) -> AppResult<i64> {
        let previous = self
            .store
            .get(session_id, NUM_VISITS_KEY)
            .await?
            .and_then(|raw| raw.parse::<i64>().ok())
            .unwrap_or(0);

        self.store
            .set(session_id, NUM_VISITS_KEY, &(previous + 1).to_string())
            .await?;

        tracing::debug!(session = %session_id, num_visits = previous, "Recorded visit");
        Ok(previous)
    }
}

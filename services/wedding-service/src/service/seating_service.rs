use common::retry::{retry, RetryPolicy};
use common::AppError;

use super::store_error;
use crate::domain::seating::{next_table, plan_seating, SeatingPlan};
use crate::repo::SeatingStore;

pub struct SeatingService<S> {
    store: S,
    capacity: usize,
    retry: RetryPolicy,
}

impl<S: SeatingStore> SeatingService<S> {
    pub fn new(store: S, capacity: usize) -> Self {
        Self::with_retry(store, capacity, RetryPolicy::default())
    }

    pub fn with_retry(store: S, capacity: usize, retry: RetryPolicy) -> Self {
        Self {
            store,
            capacity,
            retry,
        }
    }

    /// Seats every unseated attending guest on tables numbered after the
    /// highest table in use.
    pub async fn optimize(&self) -> Result<SeatingPlan, AppError> {
        let store = &self.store;

        let candidates = retry(&self.retry, db::is_transient, move || store.seating_candidates())
            .await
            .map_err(|e| store_error("load seating candidates", e))?;
        let highest = retry(&self.retry, db::is_transient, move || store.highest_table_number())
            .await
            .map_err(|e| store_error("load highest table", e))?;

        let plan = plan_seating(&candidates, next_table(highest), self.capacity);
        if plan.assignments.is_empty() {
            tracing::info!("no unseated attending guests");
            return Ok(plan);
        }

        let planned = plan.assignments.as_slice();
        let applied = retry(&self.retry, db::is_transient, move || store.apply_assignments(planned))
            .await
            .map_err(|e| store_error("apply table assignments", e))?;

        if applied.len() < planned.len() {
            tracing::warn!(
                skipped = planned.len() - applied.len(),
                "guests seated concurrently were left as they are"
            );
        }

        let result = SeatingPlan::from_assignments(applied);
        tracing::info!(
            guests_assigned = result.guests_assigned,
            tables_used = result.tables_used,
            "tables optimized"
        );
        Ok(result)
    }
}

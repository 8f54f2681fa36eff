use chrono::{NaiveDate, Utc};

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Whole days from `from` until `event`. Negative once the event has passed.
pub fn days_until(event: NaiveDate, from: NaiveDate) -> i64 {
    (event - from).num_days()
}

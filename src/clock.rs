//! Business-date helpers over the injected time provider.
//!
//! Every component that needs "today" takes a `SafeTimeProvider`; nothing
//! in the crate reads the system clock directly.

use chrono::{DateTime, NaiveDate, Utc};
use hourglass_rs::{SafeTimeProvider, TimeSource};

/// provider backed by the system clock
pub fn system() -> SafeTimeProvider {
    SafeTimeProvider::new(TimeSource::System)
}

/// provider frozen at the start of `date`, for tests and replays
pub fn fixed(date: NaiveDate) -> SafeTimeProvider {
    SafeTimeProvider::new(TimeSource::Test(start_of_day(date)))
}

/// current business date (UTC)
pub fn today(time: &SafeTimeProvider) -> NaiveDate {
    time.now().date_naive()
}

/// use `date` when given, otherwise today
pub fn date_or_today(date: Option<NaiveDate>, time: &SafeTimeProvider) -> NaiveDate {
    date.unwrap_or_else(|| today(time))
}

pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc()
}

//! Wall-clock exam timing.

use chrono::{DateTime, Utc};

/// Minutes between `start` and `now`, with millisecond precision.
///
/// Plain wall-clock difference: a clock that moved backwards yields a
/// negative value.
pub fn elapsed_minutes(start: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - start).num_milliseconds() as f64 / 1000.0 / 60.0
}

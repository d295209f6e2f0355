// Time context for the board. Every arrival is measured against Chicago civil time.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::America::Chicago;
use chrono_tz::Tz;
use std::sync::Mutex;

pub const CITY_TZ: Tz = Chicago;

/// Source of "now". Fetchers capture it once per call so every arrival in
/// one result is measured against the same instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Tz>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&CITY_TZ)
    }
}

/// Manually driven clock for tests and replays.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Tz>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Tz>) -> Self {
        FixedClock { now: Mutex::new(now) }
    }

    pub fn set(&self, now: DateTime<Tz>) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut guard) = self.now.lock() {
            *guard += by;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Tz> {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Attach the city zone to a naive local timestamp. An ambiguous wall time
/// (DST fall-back) resolves to the earlier instant; a skipped one is `None`.
pub fn localize(naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    CITY_TZ.from_local_datetime(&naive).earliest()
}

pub fn from_epoch(seconds: i64) -> Option<DateTime<Tz>> {
    CITY_TZ.timestamp_opt(seconds, 0).single()
}

/// Whole minutes from `now` until `target`, rounded half-to-even.
/// Returns `None` when the vehicle has already left.
pub fn minutes_away(target: DateTime<Tz>, now: DateTime<Tz>) -> Option<u32> {
    let seconds = (target - now).num_milliseconds() as f64 / 1000.0;
    let minutes = (seconds / 60.0).round_ties_even();
    if minutes < 0.0 {
        None
    } else {
        Some(minutes as u32)
    }
}

//! Logical timestamp generation for queued log entries.

use std::time::{SystemTime, UNIX_EPOCH};

/// Maps "number of timestamps issued so far by this logger" to a logical
/// nanosecond-scale timestamp. Implementations must be strictly increasing
/// in the issue counter for entries to ship in call order.
pub type TimeSource = Box<dyn Fn(u64) -> u64 + Send>;

/// Default time source: wall-clock milliseconds since the Unix epoch scaled
/// to nanoseconds, plus the issue counter. The counter term keeps the result
/// strictly increasing even when several entries land on the same clock tick.
#[allow(clippy::cast_possible_truncation)]
pub fn wall_clock_nanos(issued: u64) -> u64 {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default();
    millis * 1_000_000 + issued
}

pub fn default_time_source() -> TimeSource {
    Box::new(wall_clock_nanos)
}

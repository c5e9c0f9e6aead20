//! Millisecond precision UTC timestamps.
//!
//! Every timestamp the app stores (transaction dates and the system-managed
//! `createdAt`/`updatedAt` fields) is truncated to whole milliseconds and
//! converted to UTC, so a value read back from the database compares equal to
//! the value that was written.

use time::{Duration, OffsetDateTime, UtcOffset, error::ComponentRange};

const NANOS_PER_MILLI: i128 = 1_000_000;

/// The current time in UTC, truncated to whole milliseconds.
pub fn now() -> OffsetDateTime {
    truncate_to_millis(OffsetDateTime::now_utc())
}

/// Convert `datetime` to UTC and drop any precision finer than a millisecond.
pub fn truncate_to_millis(datetime: OffsetDateTime) -> OffsetDateTime {
    let datetime = datetime.to_offset(UtcOffset::UTC);
    let sub_millis = datetime.nanosecond() % 1_000_000;

    datetime - Duration::nanoseconds(sub_millis as i64)
}

/// The number of whole milliseconds between the Unix epoch and `datetime`.
pub fn to_unix_millis(datetime: OffsetDateTime) -> i64 {
    datetime.unix_timestamp_nanos().div_euclid(NANOS_PER_MILLI) as i64
}

/// Build a UTC timestamp from milliseconds since the Unix epoch.
///
/// # Errors
/// Returns an error if `millis` is outside the range `time` can represent.
pub fn from_unix_millis(millis: i64) -> Result<OffsetDateTime, ComponentRange> {
    OffsetDateTime::from_unix_timestamp_nanos(millis as i128 * NANOS_PER_MILLI)
}

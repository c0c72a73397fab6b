use std::time::{SystemTime, UNIX_EPOCH};

pub const SECS_PER_DAY: i64 = 86_400;

pub fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("System time is before Unix epoch")
        .as_secs() as i64
}

pub fn days_to_secs(days: u32) -> i64 {
    days as i64 * SECS_PER_DAY
}

/// Whether two unix timestamps fall on the same UTC calendar day.
pub fn same_utc_day(a: i64, b: i64) -> bool {
    a.div_euclid(SECS_PER_DAY) == b.div_euclid(SECS_PER_DAY)
}

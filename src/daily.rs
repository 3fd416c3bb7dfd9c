//! Per-day counter names.
//!
//! Besides an all-time counter, callers often keep one counter per calendar
//! day, named by appending the date to the base name:
//!
//! ```text
//! Enqueue            all time
//! Enqueue2026-10-16  this day only
//! ```
//!
//! The date is taken from `now` in its own UTC offset; convert `now` to the
//! reporting time zone before calling.

use time::macros::format_description;
use time::OffsetDateTime;

/// Formats the date of `now` as `YYYY-MM-DD`.
///
/// # Examples
///
/// ```rust
/// use time::macros::datetime;
/// use shardcount::daily::day_suffix;
///
/// assert_eq!(day_suffix(datetime!(2026-03-09 8:00 UTC)).unwrap(), "2026-03-09");
/// ```
pub fn day_suffix(now: OffsetDateTime) -> Result<String, time::error::Format> {
    now.date().format(format_description!("[year]-[month]-[day]"))
}

/// Name of the per-day counter of `name` for the date of `now`.
pub fn daily_name(name: &str, now: OffsetDateTime) -> Result<String, time::error::Format> {
    Ok(format!("{name}{}", day_suffix(now)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{datetime, offset};

    #[test]
    fn test_day_suffix() {
        assert_eq!(day_suffix(datetime!(2026-10-16 0:00 UTC)).unwrap(), "2026-10-16");
        assert_eq!(day_suffix(datetime!(2026-01-02 23:59 UTC)).unwrap(), "2026-01-02");
    }

    #[test]
    fn test_day_follows_offset() {
        let utc = datetime!(2026-10-16 2:30 UTC);
        let new_york = utc.to_offset(offset!(-4));
        assert_eq!(day_suffix(utc).unwrap(), "2026-10-16");
        assert_eq!(day_suffix(new_york).unwrap(), "2026-10-15");
    }

    #[test]
    fn test_daily_name() {
        let now = datetime!(2026-10-16 12:00 UTC);
        assert_eq!(daily_name("Enqueue", now).unwrap(), "Enqueue2026-10-16");
        assert_eq!(daily_name("", now).unwrap(), "2026-10-16");
    }
}

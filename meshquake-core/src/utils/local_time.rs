//! Conversion of event times into the US Pacific reference zone.
//!
//! Daylight time follows the US rules: from 2007 it runs from the second
//! Sunday of March, 02:00 PST, to the first Sunday of November, 02:00 PDT.
//! From 1987 to 2006 it ran from the first Sunday of April to the last
//! Sunday of October. Earlier years use the 1987 rule.

use time::macros::offset;
use time::{Date, Duration, Month, OffsetDateTime, Time, UtcOffset};

pub const PACIFIC_STANDARD: UtcOffset = offset!(-8);
pub const PACIFIC_DAYLIGHT: UtcOffset = offset!(-7);

/// The zone suffix appended to alert timestamps.
pub const ZONE_LABEL: &str = "PDT";

/// Converts epoch milliseconds to a UTC timestamp.
///
/// Values outside the representable range collapse to the Unix epoch.
pub fn from_epoch_millis(millis: i64) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

/// Converts epoch seconds to a UTC timestamp.
pub fn from_epoch_seconds(seconds: i64) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(seconds).unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

/// Returns the Pacific offset in effect at `at`.
pub fn pacific_offset(at: OffsetDateTime) -> UtcOffset {
    let utc = at.to_offset(UtcOffset::UTC);
    let year = utc.year();

    let (Some(start), Some(end)) = dst_bounds(year) else {
        return PACIFIC_STANDARD;
    };

    // 02:00 PST is 10:00 UTC, 02:00 PDT is 09:00 UTC.
    let dst_start = start.with_time(Time::MIDNIGHT).assume_utc() + Duration::hours(10);
    let dst_end = end.with_time(Time::MIDNIGHT).assume_utc() + Duration::hours(9);

    if utc >= dst_start && utc < dst_end {
        PACIFIC_DAYLIGHT
    } else {
        PACIFIC_STANDARD
    }
}

/// Shifts `at` into the Pacific zone.
pub fn to_pacific(at: OffsetDateTime) -> OffsetDateTime {
    at.to_offset(pacific_offset(at))
}

/// `MM-DD HH:MM` in Pacific time.
pub fn short_stamp(at: OffsetDateTime) -> String {
    let local = to_pacific(at);
    format!(
        "{:02}-{:02} {:02}:{:02}",
        u8::from(local.month()),
        local.day(),
        local.hour(),
        local.minute()
    )
}

/// `YYYY-MM-DD HH:MM:SS` in Pacific time.
pub fn long_stamp(at: OffsetDateTime) -> String {
    let local = to_pacific(at);
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        local.year(),
        u8::from(local.month()),
        local.day(),
        local.hour(),
        local.minute(),
        local.second()
    )
}

/// Local dates on which daylight time starts and ends in `year`.
fn dst_bounds(year: i32) -> (Option<Date>, Option<Date>) {
    if year >= 2007 {
        (
            nth_sunday(year, Month::March, 2),
            nth_sunday(year, Month::November, 1),
        )
    } else {
        (
            nth_sunday(year, Month::April, 1),
            last_sunday_of_october(year),
        )
    }
}

fn last_sunday_of_october(year: i32) -> Option<Date> {
    let last = Date::from_calendar_date(year, Month::October, 31).ok()?;
    let back = i64::from(last.weekday().number_days_from_sunday());
    last.checked_sub(Duration::days(back))
}

fn nth_sunday(year: i32, month: Month, n: u8) -> Option<Date> {
    let first = Date::from_calendar_date(year, month, 1).ok()?;
    let to_sunday = (7 - first.weekday().number_days_from_sunday()) % 7;
    let days = i64::from(to_sunday) + 7 * (i64::from(n) - 1);
    first.checked_add(Duration::days(days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_nth_sunday() {
        // 2024: DST began March 10 and ended November 3.
        assert_eq!(
            nth_sunday(2024, Month::March, 2),
            Some(time::macros::date!(2024 - 03 - 10))
        );
        assert_eq!(
            nth_sunday(2024, Month::November, 1),
            Some(time::macros::date!(2024 - 11 - 03))
        );
        // 2026: March 1 is itself a Sunday.
        assert_eq!(
            nth_sunday(2026, Month::March, 2),
            Some(time::macros::date!(2026 - 03 - 08))
        );
    }

    #[test]
    fn test_offset_switches_at_two_am_local() {
        assert_eq!(pacific_offset(datetime!(2024-03-10 09:59 UTC)), PACIFIC_STANDARD);
        assert_eq!(pacific_offset(datetime!(2024-03-10 10:00 UTC)), PACIFIC_DAYLIGHT);
        assert_eq!(pacific_offset(datetime!(2024-11-03 08:59 UTC)), PACIFIC_DAYLIGHT);
        assert_eq!(pacific_offset(datetime!(2024-11-03 09:00 UTC)), PACIFIC_STANDARD);
        assert_eq!(pacific_offset(datetime!(2024-01-15 12:00 UTC)), PACIFIC_STANDARD);
        assert_eq!(pacific_offset(datetime!(2024-07-04 12:00 UTC)), PACIFIC_DAYLIGHT);
    }

    #[test]
    fn test_offset_before_2007_uses_april_to_october() {
        // 2006: DST began April 2 and ended October 29.
        assert_eq!(
            last_sunday_of_october(2006),
            Some(time::macros::date!(2006 - 10 - 29))
        );
        assert_eq!(pacific_offset(datetime!(2006-03-20 12:00 UTC)), PACIFIC_STANDARD);
        assert_eq!(pacific_offset(datetime!(2006-04-02 09:59 UTC)), PACIFIC_STANDARD);
        assert_eq!(pacific_offset(datetime!(2006-04-02 10:00 UTC)), PACIFIC_DAYLIGHT);
        assert_eq!(pacific_offset(datetime!(2006-10-29 08:59 UTC)), PACIFIC_DAYLIGHT);
        assert_eq!(pacific_offset(datetime!(2006-10-29 09:00 UTC)), PACIFIC_STANDARD);
        assert_eq!(pacific_offset(datetime!(2006-11-02 12:00 UTC)), PACIFIC_STANDARD);
    }

    #[test]
    fn test_short_stamp() {
        // 2024-06-10 06:13:20 UTC is 2024-06-09 23:13 PDT.
        let at = from_epoch_millis(1_717_999_999_999 + 1);
        assert_eq!(short_stamp(at), "06-09 23:13");

        // Winter: 2024-01-02 03:04 UTC is 2024-01-01 19:04 PST.
        assert_eq!(short_stamp(datetime!(2024-01-02 03:04 UTC)), "01-01 19:04");
    }

    #[test]
    fn test_long_stamp() {
        assert_eq!(
            long_stamp(datetime!(2024-07-04 19:05:09 UTC)),
            "2024-07-04 12:05:09"
        );
    }

    #[test]
    fn test_epoch_conversions() {
        assert_eq!(from_epoch_millis(0), OffsetDateTime::UNIX_EPOCH);
        assert_eq!(from_epoch_seconds(86_400).day(), 2);
        assert_eq!(from_epoch_millis(i64::MAX), OffsetDateTime::UNIX_EPOCH);
    }
}

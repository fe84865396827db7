//! Compact rendering of second counts for status lines.

const YEAR: i64 = 60 * 60 * 24 * 365;
const MONTH: i64 = 60 * 60 * 24 * 30;
const DAY: i64 = 60 * 60 * 24;
const HOUR: i64 = 60 * 60;
const MINUTE: i64 = 60;

/// Renders `seconds` as a compact age like `"3d04h"` or `"01h10"`.
///
/// At most two units are shown. Years, months, and days are emitted
/// greedily in that order, where a month count of two or less folds into
/// days instead of producing a misleadingly coarse label. Whatever budget
/// remains goes to zero-padded hours and, if both units are still free,
/// minutes. Seconds are always dropped; negative input renders as zero.
pub fn humanize(seconds: i64) -> String {
    let mut seconds = seconds.max(0);
    let mut out = String::new();
    let mut remaining_units = 2;

    let years = seconds / YEAR;
    if years > 0 {
        out.push_str(&format!("{years}Y"));
        seconds %= YEAR;
        remaining_units -= 1;
        if remaining_units <= 0 {
            return out;
        }
    }
    let months = seconds / MONTH;
    if months > 2 {
        out.push_str(&format!("{months}M"));
        seconds %= MONTH;
        remaining_units -= 1;
        if remaining_units <= 0 {
            return out;
        }
    }
    let days = seconds / DAY;
    if days > 0 {
        out.push_str(&format!("{days}d"));
        seconds %= DAY;
        remaining_units -= 1;
        if remaining_units <= 0 {
            return out;
        }
    }
    let hours = seconds / HOUR;
    seconds %= HOUR;
    let minutes = seconds / MINUTE;
    seconds %= MINUTE;
    if remaining_units > 1 {
        out.push_str(&format!("{hours:02}h{minutes:02}"));
    } else {
        out.push_str(&format!("{hours:02}h"));
    }
    debug_assert!(seconds < 60);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hours_and_minutes() {
        assert_eq!(humanize(0), "00h00");
        assert_eq!(humanize(59), "00h00");
        assert_eq!(humanize(60), "00h01");
        assert_eq!(humanize(3661), "01h01");
        assert_eq!(humanize(7 * 3600 + 30 * 60), "07h30");
    }

    #[test]
    fn test_days_consume_one_unit() {
        // 90061s is 1d 1h 1m 1s: the day takes one unit, leaving a single
        // unit for the hour; minutes are dropped.
        assert_eq!(humanize(90061), "1d01h");
        assert_eq!(humanize(90000), "1d01h");
        assert_eq!(humanize(DAY), "1d00h");
    }

    #[test]
    fn test_small_month_counts_fold_into_days() {
        // 2 months worth of seconds stays in days (60d), 3 months does not.
        assert_eq!(humanize(2 * MONTH), "60d00h");
        assert_eq!(humanize(3 * MONTH), "3M00h");
        assert_eq!(humanize(3 * MONTH + 5 * DAY), "3M5d");
    }

    #[test]
    fn test_years() {
        assert_eq!(humanize(YEAR), "1Y00h");
        // The year consumes one unit, so a day remainder still shows.
        assert_eq!(humanize(YEAR + DAY), "1Y1d");
        assert_eq!(humanize(YEAR + DAY + HOUR), "1Y1d");
        assert_eq!(humanize(6 * YEAR + 7 * DAY), "6Y7d");
    }

    #[test]
    fn test_negative_clamps_to_zero() {
        assert_eq!(humanize(-5), "00h00");
    }
}

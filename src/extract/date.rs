use chrono::{Duration, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::OnceLock;

/// Output and input shape of a complete date, e.g. "3 March 2024"
const FULL_DATE_FORMAT: &str = "%d %B %Y";
const DISPLAY_FORMAT: &str = "%-d %B %Y";

struct RelativePatterns {
    hours: Regex,
    minutes: Regex,
    just_now: Regex,
    yesterday: Regex,
    days: Regex,
}

fn patterns() -> &'static RelativePatterns {
    static PATTERNS: OnceLock<RelativePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| RelativePatterns {
        hours: Regex::new(r"(?i)\b\d+\s*(h|hr|hrs|hour|hours)\b").expect("static regex"),
        minutes: Regex::new(r"(?i)\b\d+\s*(m|min|mins|minute|minutes)\b").expect("static regex"),
        just_now: Regex::new(r"(?i)\bjust now\b").expect("static regex"),
        yesterday: Regex::new(r"(?i)\byesterday\b").expect("static regex"),
        days: Regex::new(r"(?i)\b(\d+)\s*(d|day|days)\b").expect("static regex"),
    })
}

/// Turn a raw date label from a review card into "{day} {MonthName} {year}".
///
/// Relative labels ("6 h", "20 mins", "Yesterday", "2 d") resolve against
/// `now`. A label that already carries a year is returned untouched, and
/// anything else gets `current_year` appended. Labels that match none of the
/// known shapes still take the year-append path, so the result is
/// best-effort rather than guaranteed to parse.
pub fn normalize(raw: &str, current_year: i32, now: NaiveDateTime) -> String {
    if let Some(date) = resolve_relative(raw, now) {
        return date.format(DISPLAY_FORMAT).to_string();
    }

    if NaiveDate::parse_from_str(raw.trim(), FULL_DATE_FORMAT).is_ok() {
        return raw.to_string();
    }

    format!("{} {}", raw, current_year)
}

fn resolve_relative(raw: &str, now: NaiveDateTime) -> Option<NaiveDate> {
    let p = patterns();
    let today = now.date();

    if p.hours.is_match(raw) || p.minutes.is_match(raw) || p.just_now.is_match(raw) {
        return Some(today);
    }

    if p.yesterday.is_match(raw) {
        return today.checked_sub_signed(Duration::days(1));
    }

    if let Some(caps) = p.days.captures(raw) {
        let days: i64 = caps[1].parse().ok()?;
        return today.checked_sub_signed(Duration::try_days(days)?);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_hours_resolve_to_today() {
        assert_eq!(normalize("6 h", 2025, at(2025, 7, 4)), "4 July 2025");
        assert_eq!(normalize("23 hrs", 1999, at(2024, 12, 31)), "31 December 2024");
        assert_eq!(normalize("1 hour ago", 2025, at(2025, 1, 9)), "9 January 2025");
    }

    #[test]
    fn test_complete_date_passes_through() {
        assert_eq!(normalize("3 March 2024", 2025, at(2025, 6, 1)), "3 March 2024");
        assert_eq!(normalize("28 February 2023", 2025, at(2025, 6, 1)), "28 February 2023");
    }

    #[test]
    fn test_missing_year_is_appended() {
        assert_eq!(normalize("3 March", 2025, at(2025, 6, 1)), "3 March 2025");
        assert_eq!(normalize("17 December", 2024, at(2025, 1, 2)), "17 December 2024");
    }

    #[test]
    fn test_unparseable_falls_through_to_year_append() {
        assert_eq!(normalize("sometime", 2025, at(2025, 6, 1)), "sometime 2025");
    }

    #[test]
    fn test_out_of_range_day_count_falls_through() {
        let now = at(2025, 6, 1);
        assert_eq!(normalize("99999999999999999 d", 2025, now), "99999999999999999 d 2025");
        assert_eq!(normalize("99999999999999999999999 days", 2025, now), "99999999999999999999999 days 2025");
        assert_eq!(normalize("3 March 2024", 2025, now), "3 March 2024");
    }

    #[test]
    fn test_other_relative_forms() {
        let now = at(2025, 3, 1);
        assert_eq!(normalize("12 mins", 2025, now), "1 March 2025");
        assert_eq!(normalize("Just now", 2025, now), "1 March 2025");
        assert_eq!(normalize("Yesterday at 09:12", 2025, now), "28 February 2025");
        assert_eq!(normalize("3 d", 2025, now), "26 February 2025");
    }

    #[test]
    fn test_month_names_do_not_look_relative() {
        let now = at(2025, 6, 1);
        assert_eq!(normalize("5 May", 2025, now), "5 May 2025");
        assert_eq!(normalize("2 December", 2024, now), "2 December 2024");
        assert_eq!(normalize("9 March", 2025, now), "9 March 2025");
    }
}

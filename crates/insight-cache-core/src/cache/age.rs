use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Human-readable age of `created_at` relative to the current clock.
pub fn format_age(created_at: Option<&str>) -> String {
    format_age_at(created_at, Utc::now())
}

pub fn format_age_at(created_at: Option<&str>, now: DateTime<Utc>) -> String {
    match created_at.and_then(parse_timestamp) {
        Some(ts) => format_elapsed((now - ts).num_seconds()),
        None => "Unknown".to_string(),
    }
}

/// Buckets elapsed seconds; values below a minute (including negative
/// ones from clock skew) read as "Just now".
pub fn format_elapsed(seconds: i64) -> String {
    if seconds < MINUTE {
        "Just now".to_string()
    } else if seconds < HOUR {
        plural(seconds / MINUTE, "minute")
    } else if seconds < DAY {
        plural(seconds / HOUR, "hour")
    } else if seconds < WEEK {
        plural(seconds / DAY, "day")
    } else {
        plural(seconds / WEEK, "week")
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("{} {} ago", n, unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}

/// RFC 3339 timestamps keep their offset; naive ones are read as local time.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .map(|local| local.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ago(now: DateTime<Utc>, d: Duration) -> String {
        (now - d).to_rfc3339()
    }

    #[test]
    fn boundaries() {
        let now = Utc::now();
        let at = |d| format_age_at(Some(&ago(now, d)), now);
        assert_eq!(at(Duration::seconds(30)), "Just now");
        assert_eq!(at(Duration::seconds(59)), "Just now");
        assert_eq!(at(Duration::seconds(60)), "1 minute ago");
        assert_eq!(at(Duration::seconds(90)), "1 minute ago");
        assert_eq!(at(Duration::minutes(59)), "59 minutes ago");
        assert_eq!(at(Duration::hours(1)), "1 hour ago");
        assert_eq!(at(Duration::hours(2)), "2 hours ago");
        assert_eq!(at(Duration::days(1)), "1 day ago");
        assert_eq!(at(Duration::days(3)), "3 days ago");
        assert_eq!(at(Duration::days(7)), "1 week ago");
        assert_eq!(at(Duration::days(30)), "4 weeks ago");
    }

    #[test]
    fn unknown_inputs() {
        assert_eq!(format_age(None), "Unknown");
        assert_eq!(format_age(Some("")), "Unknown");
        assert_eq!(format_age(Some("yesterday-ish")), "Unknown");
    }

    #[test]
    fn future_reads_as_just_now() {
        let now = Utc::now();
        let future = (now + Duration::hours(3)).to_rfc3339();
        assert_eq!(format_age_at(Some(&future), now), "Just now");
    }

    #[test]
    fn zulu_and_naive_forms_parse() {
        assert!(parse_timestamp("2025-03-01T10:00:00Z").is_some());
        assert!(parse_timestamp("2025-03-01T10:00:00.123456+02:00").is_some());
        assert!(parse_timestamp("2025-03-01 10:00:00.123").is_some());
        assert!(parse_timestamp("2025-03-01T10:00:00").is_some());
    }

    #[test]
    fn naive_local_time_is_compared_against_local_clock() {
        let now = Utc::now();
        let two_hours_ago = (now - Duration::hours(2) - Duration::seconds(30))
            .with_timezone(&Local)
            .naive_local();
        let raw = two_hours_ago.format("%Y-%m-%d %H:%M:%S").to_string();
        assert_eq!(format_age_at(Some(&raw), now), "2 hours ago");
    }
}

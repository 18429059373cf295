use chrono::{DateTime, Duration, TimeZone};

/// `MM:SS`, both fields zero-padded to two digits
pub fn format_time(seconds: u32) -> String {
    let minutes = seconds / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}", minutes, secs)
}

/// Wall-clock time at which a countdown with `remaining_secs` left will hit zero
pub fn ends_at<Tz: TimeZone>(now: &DateTime<Tz>, remaining_secs: u32) -> String
where
    Tz::Offset: std::fmt::Display,
{
    (now.clone() + Duration::seconds(i64::from(remaining_secs)))
        .format("%H:%M")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(59), "00:59");
        assert_eq!(format_time(60), "01:00");
        assert_eq!(format_time(25 * 60), "25:00");
        assert_eq!(format_time(5 * 60 + 7), "05:07");
    }

    #[test]
    fn test_format_time_full_hour() {
        assert_eq!(format_time(60 * 60), "60:00");
    }

    #[test]
    fn test_ends_at() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 13, 50, 30).unwrap();
        assert_eq!(ends_at(&now, 25 * 60), "14:15");
        assert_eq!(ends_at(&now, 0), "13:50");
    }

    #[test]
    fn test_ends_at_wraps_midnight() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 23, 55, 0).unwrap();
        assert_eq!(ends_at(&now, 10 * 60), "00:05");
    }
}

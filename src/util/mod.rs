pub mod featured;
pub mod telemetry;

use chrono::{DateTime, Local, TimeDelta};

/// Returns the given time as a String
///
/// Format: `YYYY-MM-DD@HH:MM:SS`
pub fn format_time(time: &DateTime<Local>) -> String {
    time.format("%Y-%m-%d@%H:%M:%S").to_string()
}

/// Renders a duration as `1h02m03s`, dropping leading zero units
pub fn format_elapsed(elapsed: TimeDelta) -> String {
    let secs = elapsed.num_seconds().max(0);
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);

    match (h, m) {
        (0, 0) => format!("{}s", s),
        (0, _) => format!("{}m{:02}s", m, s),
        _ => format!("{}h{:02}m{:02}s", h, m, s),
    }
}

#[cfg(test)]
mod test {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(TimeDelta::seconds(7)), "7s");
        assert_eq!(format_elapsed(TimeDelta::seconds(65)), "1m05s");
        assert_eq!(format_elapsed(TimeDelta::seconds(3723)), "1h02m03s");
        assert_eq!(format_elapsed(TimeDelta::seconds(-4)), "0s");
    }

    #[test]
    fn test_format_time() {
        let time = Local.with_ymd_and_hms(2025, 6, 6, 11, 9, 16).unwrap();
        assert_eq!(format_time(&time), "2025-06-06@11:09:16");
    }
}

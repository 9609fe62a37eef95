//! Human-readable values for the console table.

use chrono::{DateTime, TimeZone};

const UNITS: [(i32, &str); 4] = [(4, "TB"), (3, "GB"), (2, "MB"), (1, "KB")];

/// Render a byte count with the largest unit whose whole part is at least 1.
///
/// ```
/// use procmon::output::format_bytes;
///
/// assert_eq!(format_bytes(10), "10 Bytes");
/// assert_eq!(format_bytes(129394278), "123.4 MB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    for (power, unit) in UNITS {
        let value = bytes as f64 / 1024f64.powi(power);
        if value.trunc() >= 1.0 {
            return format!("{:.1} {}", value, unit);
        }
    }

    format!("{} Bytes", bytes)
}

/// `HH:MM:SS` in the timestamp's own time zone.
pub fn format_time<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    timestamp.format("%H:%M:%S").to_string()
}

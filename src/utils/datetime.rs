use chrono::{DateTime, Utc};

/// Full date and time for day-ahead messages, e.g. "Friday, March 14 at 18:00".
pub fn format_event_date(dt: &DateTime<Utc>) -> String {
    dt.format("%A, %B %-d at %H:%M").to_string()
}

/// Time of day only, for imminent reminders.
pub fn format_event_time(dt: &DateTime<Utc>) -> String {
    dt.format("%H:%M").to_string()
}

//! Outgoing notification texts, rendered for Telegram's HTML parse mode.
//!
//! Every builder takes the event row as-is; titles and URLs are escaped
//! here, not at the call sites.

use crate::database::models::Event;
use crate::utils::datetime::{format_event_date, format_event_time};
use crate::utils::html::escape_html;

/// Reminder sent when an event is ~24 hours away.
pub fn reminder_24h(event: &Event) -> String {
    let mut text = format!(
        "⏰ <b>Reminder: {}</b>\n\n<b>{}</b>\n📅 {} (in 24 hours)",
        event.kind.label(),
        escape_html(&event.title),
        format_event_date(&event.starts_at),
    );
    if let Some(url) = &event.meeting_url {
        text.push_str(&format!(
            "\n\n🔗 <a href=\"{}\">Meeting link</a>",
            escape_html(url)
        ));
    }
    text
}

/// Reminder sent when an event is ~1 hour away.
pub fn reminder_1h(event: &Event) -> String {
    let mut text = format!(
        "🔔 <b>{} starts in 1 hour!</b>\n\n<b>{}</b>\n🕐 {}",
        event.kind.label(),
        escape_html(&event.title),
        format_event_time(&event.starts_at),
    );
    if let Some(url) = &event.meeting_url {
        text.push_str(&format!(
            "\n\n🔗 <a href=\"{}\">Join now</a>",
            escape_html(url)
        ));
    }
    text
}

/// Notice sent once a recording link is published. The candidate query
/// guarantees a recording URL is present.
pub fn recording_ready(event: &Event) -> String {
    let url = event.recording_url.as_deref().unwrap_or_default();
    format!(
        "🎬 <b>Recording available: {}</b>\n\n🔗 <a href=\"{}\">Watch the recording</a>",
        escape_html(&event.title),
        escape_html(url)
    )
}

/// Ad-hoc announcement triggered manually by an admin.
pub fn announcement(event: &Event) -> String {
    let mut text = format!(
        "📢 <b>{}: {}</b>\n\n🕐 {}",
        event.kind.label(),
        escape_html(&event.title),
        format_event_date(&event.starts_at),
    );
    if let Some(url) = &event.meeting_url {
        text.push_str(&format!(
            "\n\n🔗 <a href=\"{}\">Meeting link</a>",
            escape_html(url)
        ));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::EventKind;
    use chrono::{TimeZone, Utc};

    fn webinar(meeting_url: Option<&str>, recording_url: Option<&str>) -> Event {
        Event {
            id: "evt-1".to_string(),
            title: "Ownership & Borrowing".to_string(),
            kind: EventKind::Webinar,
            starts_at: Utc
                .with_ymd_and_hms(2025, 3, 14, 18, 0, 0)
                .single()
                .expect("valid timestamp"),
            ends_at: None,
            meeting_url: meeting_url.map(String::from),
            recording_url: recording_url.map(String::from),
            notify_enabled: true,
            notified_24h: false,
            notified_1h: false,
            notified_record: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_reminder_24h_with_link() {
        let text = reminder_24h(&webinar(Some("https://meet.example.com/rust"), None));
        assert!(text.contains("⏰ <b>Reminder: 🖥 Webinar</b>"));
        assert!(text.contains("Ownership &amp; Borrowing"));
        assert!(text.contains("Friday, March 14 at 18:00 (in 24 hours)"));
        assert!(text.contains("<a href=\"https://meet.example.com/rust\">Meeting link</a>"));
    }

    #[test]
    fn test_reminder_24h_without_link() {
        let text = reminder_24h(&webinar(None, None));
        assert!(!text.contains("<a href"));
    }

    #[test]
    fn test_reminder_1h_uses_time_only() {
        let text = reminder_1h(&webinar(Some("https://meet.example.com/rust"), None));
        assert!(text.contains("🔔 <b>🖥 Webinar starts in 1 hour!</b>"));
        assert!(text.contains("🕐 18:00"));
        assert!(!text.contains("March"));
        assert!(text.contains("Join now"));
    }

    #[test]
    fn test_recording_ready() {
        let text = recording_ready(&webinar(None, Some("https://videos.example.com/42")));
        assert!(text.contains("🎬 <b>Recording available: Ownership &amp; Borrowing</b>"));
        assert!(text.contains("<a href=\"https://videos.example.com/42\">Watch the recording</a>"));
    }

    #[test]
    fn test_announcement() {
        let text = announcement(&webinar(Some("https://meet.example.com/rust"), None));
        assert!(text.starts_with("📢 <b>🖥 Webinar: Ownership &amp; Borrowing</b>"));
        assert!(text.contains("Friday, March 14 at 18:00"));
    }

    #[test]
    fn test_title_markup_is_escaped() {
        let mut event = webinar(None, None);
        event.title = "<script>alert(1)</script>".to_string();
        let text = reminder_24h(&event);
        assert!(!text.contains("<script>"));
        assert!(text.contains("&lt;script&gt;"));
    }
}

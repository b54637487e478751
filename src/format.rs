//! Display helpers for dates and durations.

use crate::visit::ScheduledSlot;
use chrono::{DateTime, Duration, FixedOffset, Utc};

/// Running timer text, `"HH : MM : SS"`. Negative spans show as zero.
pub fn format_elapsed(since: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let total = (now - since).num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours:02} : {minutes:02} : {seconds:02}")
}

/// Human length of a span: `"45 min"`, `"1 hour 30 min"`, `"2 hours"`.
pub fn format_duration(span: Duration) -> String {
    let hours = span.num_hours();
    let minutes = span.num_minutes() % 60;
    match (hours, minutes) {
        (1, 0) => "1 hour".to_string(),
        (1, m) => format!("1 hour {m} min"),
        (h, 0) if h > 1 => format!("{h} hours"),
        (h, m) if h > 1 => format!("{h} hours {m} min"),
        (_, m) => format!("{m} min"),
    }
}

pub fn format_slot_duration(slot: &ScheduledSlot) -> String {
    format_duration(slot.duration())
}

/// `"Mon, Oct 20, 2026"` in the given offset.
pub fn format_visit_date(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format("%a, %b %-d, %Y").to_string()
}

/// `"09:00 - 10:30"` in the given offset.
pub fn format_time_range(slot: &ScheduledSlot, offset: FixedOffset) -> String {
    format!(
        "{} - {}",
        slot.from().with_timezone(&offset).format("%H:%M"),
        slot.to().with_timezone(&offset).format("%H:%M")
    )
}

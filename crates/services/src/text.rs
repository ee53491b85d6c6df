//! Small presentation helpers shared by the feed and detail views.

use chrono::{DateTime, Utc};

/// Truncate to `max_chars` characters with an ellipsis. Operates on chars,
/// not bytes, so multi-byte content never splits mid-character.
pub fn preview(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content.to_string();
    }
    let mut out: String = content.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

/// Coarse relative age: days, then hours, then minutes, then "Just now".
pub fn relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(timestamp);
    if elapsed.num_days() > 0 {
        return format!("{}d ago", elapsed.num_days());
    }
    if elapsed.num_hours() > 0 {
        return format!("{}h ago", elapsed.num_hours());
    }
    if elapsed.num_minutes() > 0 {
        return format!("{}m ago", elapsed.num_minutes());
    }
    "Just now".to_string()
}

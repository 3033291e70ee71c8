// src/utils/humanize.rs
use chrono::{DateTime, Utc};

/// Renders the age of `then` relative to `now` the way the profile pages show it:
/// "Today", "Yesterday", "3 days ago", "1 week ago", "2 months ago", ...
///
/// Months are 30-day blocks and years 365-day blocks. Timestamps in the future
/// render as "Recently".
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now - then).num_days();

    if days < 0 {
        return "Recently".to_string();
    }

    match days {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        2..=6 => format!("{} days ago", days),
        7..=29 => plural(days / 7, "week"),
        30..=364 => plural(days / 30, "month"),
        _ => plural(days / 365, "year"),
    }
}

fn plural(count: i64, unit: &str) -> String {
    format!("{} {}{} ago", count, unit, if count > 1 { "s" } else { "" })
}

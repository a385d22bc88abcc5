//! Display formatting helpers for feed timestamps and card text.

use chrono::{DateTime, Utc};

/// Human-readable age of a timestamp relative to `now`:
/// "just now", "5 minutes ago", "2 hours ago", "3 days ago", then the
/// calendar date for anything a week old or more.
pub fn relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
  let seconds = (now - at).num_seconds();
  if seconds < 60 {
    return "just now".to_string();
  }

  let minutes = seconds / 60;
  if minutes < 60 {
    return plural(minutes, "minute");
  }

  let hours = minutes / 60;
  if hours < 24 {
    return plural(hours, "hour");
  }

  let days = hours / 24;
  if days < 7 {
    return plural(days, "day");
  }

  at.format("%b %-d, %Y").to_string()
}

fn plural(n: i64, unit: &str) -> String {
  if n == 1 {
    format!("1 {unit} ago")
  } else {
    format!("{n} {unit}s ago")
  }
}

/// Truncate to `max_chars`, appending an ellipsis when anything was cut.
pub fn truncate(text: &str, max_chars: usize) -> String {
  if text.chars().count() <= max_chars {
    return text.to_string();
  }
  let cut: String = text.chars().take(max_chars).collect();
  format!("{cut}...")
}

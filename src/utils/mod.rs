// Utility functions
pub mod sanitize;
pub mod validation;

use chrono::{DateTime, Datelike, Utc};
use std::collections::HashSet;

/// Deduplicate `items` by `key`, keeping the first occurrence of each key
/// and preserving input order
pub fn uniq_by<T, K, F>(items: Vec<T>, key: F) -> Vec<T>
where
    K: std::hash::Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key(item)))
        .collect()
}

/// Human-friendly date: "Nd ago" within the last month, then "8 Mar"
pub fn prettify_date(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days_ago = (now - date).num_days();
    if days_ago > 30 {
        const MONTHS: [&str; 12] = [
            "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
        ];
        let month = MONTHS[date.month0() as usize];
        return format!("{} {}", date.day(), month);
    }
    format!("{}d ago", days_ago.max(0))
}

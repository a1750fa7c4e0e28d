//! Recent-activity view: grouping by actor and display helpers.

use std::collections::HashMap;

use auditvault_core::models::ActivityItem;
use serde::Serialize;
use serde_json::Value as JsonValue;

pub const UNKNOWN_ACTOR: &str = "unknown";

const KNOWN_CATEGORIES: [&str; 8] = [
    "certificate",
    "inspection",
    "transfer",
    "mint",
    "burn",
    "swap",
    "approval",
    "stake",
];

/// One row of the grouped activity table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActorRow {
    pub actor: String,
    /// Newest first
    pub actions: Vec<ActivityItem>,
    pub latest_timestamp: Option<i64>,
    pub latest_type: Option<String>,
    pub latest_tx: Option<String>,
    pub total_volume: f64,
}

impl ActorRow {
    pub fn action_count(&self) -> usize {
        self.actions.len()
    }
}

fn matches_search(actor: &str, item: &ActivityItem, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    actor.to_lowercase().contains(needle)
        || item.kind.to_lowercase().contains(needle)
        || item
            .subject
            .as_deref()
            .is_some_and(|s| s.to_lowercase().contains(needle))
}

fn item_volume(item: &ActivityItem) -> f64 {
    let Some(details) = item.details.as_ref() else {
        return 0.0;
    };
    let value = details
        .get("amount")
        .filter(|v| is_truthy(v))
        .or_else(|| details.get("value"));
    match value {
        Some(JsonValue::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(JsonValue::String(s)) => parse_leading_float(s),
        _ => 0.0,
    }
}

fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        JsonValue::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Parses the longest numeric prefix, so `"2.5 ETH"` reads as 2.5.
fn parse_leading_float(s: &str) -> f64 {
    let s = s.trim_start();
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in s.char_indices() {
        match c {
            '0'..='9' => end = i + 1,
            '.' if !seen_dot => seen_dot = true,
            '-' | '+' if i == 0 => {}
            _ => break,
        }
    }
    s[..end].parse().unwrap_or(0.0)
}

/// Group items by actor, one row per distinct actor.
///
/// `search` filters individual items (case-insensitive substring of actor,
/// type or subject); actors left with no items are dropped. Rows are ordered
/// by action count, then by latest timestamp, both descending.
pub fn group_by_actor(items: &[ActivityItem], search: &str) -> Vec<ActorRow> {
    let needle = search.trim().to_lowercase();
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<ActivityItem>> = HashMap::new();

    for item in items {
        let actor = item
            .actor
            .clone()
            .unwrap_or_else(|| UNKNOWN_ACTOR.to_string());
        if !matches_search(&actor, item, &needle) {
            continue;
        }
        groups
            .entry(actor.clone())
            .or_insert_with(|| {
                order.push(actor);
                Vec::new()
            })
            .push(item.clone());
    }

    let mut rows: Vec<ActorRow> = order
        .into_iter()
        .filter_map(|actor| {
            let mut actions = groups.remove(&actor)?;
            actions.sort_by_key(|a| std::cmp::Reverse(a.timestamp.unwrap_or(0)));
            let latest = actions.first();
            Some(ActorRow {
                latest_timestamp: latest.and_then(|a| a.timestamp),
                latest_type: latest.map(|a| a.kind.clone()),
                latest_tx: latest.and_then(|a| a.tx_hash.clone()),
                total_volume: actions.iter().map(item_volume).sum(),
                actor,
                actions,
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        b.action_count()
            .cmp(&a.action_count())
            .then_with(|| {
                b.latest_timestamp
                    .unwrap_or(0)
                    .cmp(&a.latest_timestamp.unwrap_or(0))
            })
    });
    rows
}

/// `0x1234567890abcdef` -> `0x1234...cdef`. Short input is returned as is.
pub fn truncate_address(address: &str, start: usize, end: usize) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= start + end {
        return address.to_string();
    }
    let head: String = chars[..start].iter().collect();
    let tail: String = chars[chars.len() - end..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Relative age of a unix-seconds timestamp against `now` (also unix seconds).
pub fn format_relative(timestamp: Option<i64>, now: i64) -> String {
    let Some(ts) = timestamp.filter(|ts| *ts != 0) else {
        return "-".to_string();
    };
    let diff = now - ts;
    let (days, hours, minutes) = (diff / 86_400, diff / 3_600, diff / 60);
    if days > 0 {
        format!("{}d ago", days)
    } else if hours > 0 {
        format!("{}h ago", hours)
    } else if minutes > 0 {
        format!("{}m ago", minutes)
    } else {
        "Just now".to_string()
    }
}

/// Category of an activity type, e.g. `certificate_onchain` -> `certificate`.
pub fn activity_category(kind: &str) -> &'static str {
    let prefix = kind.split('_').next().unwrap_or_default().to_lowercase();
    KNOWN_CATEGORIES
        .iter()
        .find(|c| **c == prefix)
        .copied()
        .unwrap_or("default")
}

//! Staleness pruning and same-event deduplication.
//!
//! School status notices (closures, delays, reopenings) arrive as bursts
//! of near-duplicate emails and go stale within a day, so they get a
//! short 24-hour freshness window; everything else gets 48 hours. An
//! unparseable timestamp fails open: the item is kept, because hiding a
//! real notice costs more than showing a stale one.
//!
//! Within the fresh set, notices about the same school event collapse to
//! one. An explicit "UPDATE:" subject wins; otherwise the first notice
//! seen stands.

use chrono::{DateTime, Duration, Utc};

use crate::classify::keywords::SCHOOL_EVENT_KEYWORDS;
use crate::types::InboundItem;

/// Freshness window for school/event status notices.
pub const SCHOOL_EVENT_MAX_AGE_HOURS: i64 = 24;
/// Freshness window for everything else.
pub const GENERAL_MAX_AGE_HOURS: i64 = 48;

const STATUS_WORDS: &[&str] = &["closed", "delay", "open"];

fn is_school_event(item: &InboundItem) -> bool {
    let subject = item.subject.to_lowercase();
    SCHOOL_EVENT_KEYWORDS.iter().any(|k| subject.contains(k))
}

/// Heuristic: two emails describe the same school event when both
/// subjects mention "school" and share a status word — "closed" in both,
/// "delay" in both, or "open" in both. "FCPS Schools Closed" and
/// "UPDATE: Schools Closed Through Friday" are one burst; a closure and
/// a reopening are distinct notices a parent needs to see separately.
pub fn same_school_event(a: &InboundItem, b: &InboundItem) -> bool {
    let sa = a.subject.to_lowercase();
    let sb = b.subject.to_lowercase();
    sa.contains("school")
        && sb.contains("school")
        && STATUS_WORDS.iter().any(|w| sa.contains(w) && sb.contains(w))
}

fn is_fresh(item: &InboundItem, now: DateTime<Utc>) -> bool {
    let max_age = if is_school_event(item) {
        Duration::hours(SCHOOL_EVENT_MAX_AGE_HOURS)
    } else {
        Duration::hours(GENERAL_MAX_AGE_HOURS)
    };
    match item.received_time() {
        Some(received) => now.signed_duration_since(received) <= max_age,
        // Fail open on malformed timestamps.
        None => true,
    }
}

fn is_update(item: &InboundItem) -> bool {
    item.subject.to_lowercase().starts_with("update:")
}

/// Drop stale items, then collapse same-event school notices. The
/// surviving notice keeps the position of the first one seen; an
/// "UPDATE:" subject replaces a non-update in place.
pub fn prune(items: Vec<InboundItem>, now: DateTime<Utc>) -> Vec<InboundItem> {
    let fresh: Vec<InboundItem> = items
        .into_iter()
        .filter(|item| {
            let keep = is_fresh(item, now);
            if !keep {
                log::debug!("pruned stale item: {}", item.subject);
            }
            keep
        })
        .collect();

    let mut survivors: Vec<InboundItem> = Vec::with_capacity(fresh.len());
    for item in fresh {
        match survivors.iter_mut().find(|s| same_school_event(s, &item)) {
            Some(existing) => {
                if is_update(&item) && !is_update(existing) {
                    log::debug!(
                        "superseded '{}' with '{}'",
                        existing.subject,
                        item.subject
                    );
                    *existing = item;
                }
            }
            None => survivors.push(item),
        }
    }
    survivors
}

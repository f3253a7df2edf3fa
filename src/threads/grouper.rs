//! Subject normalization and thread grouping.
//!
//! Emails sharing a normalized subject form one thread. Normalization
//! strips reply/forward prefixes repeatedly until the subject is stable,
//! so "Re: [EXTERNAL] Re: Fwd: Picnic" and "Picnic" land in the same
//! thread. Thread members are ordered oldest first by received time.

use std::collections::HashMap;

use crate::classify::keywords::REPLY_PREFIXES;
use crate::types::{InboundItem, Thread};

/// Strip reply/forward prefixes and collapse whitespace. Lower-cases the
/// result so grouping is case-insensitive. Idempotent: normalizing an
/// already-normalized subject changes nothing.
pub fn normalize_subject(subject: &str) -> String {
    let mut current = subject.trim().to_lowercase();
    loop {
        let mut stripped = false;
        for prefix in REPLY_PREFIXES {
            if let Some(rest) = current.strip_prefix(prefix) {
                current = rest.trim_start().to_string();
                stripped = true;
                break;
            }
        }
        if !stripped {
            break;
        }
    }
    current.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Group emails into threads by normalized subject.
///
/// Thread order follows first appearance in the input; within a thread,
/// items sort oldest first by received time. Items with unparseable
/// timestamps sort before dated ones, so a dated item is always `latest()`
/// when one exists.
pub fn group(items: Vec<InboundItem>) -> Vec<Thread> {
    let mut order: Vec<String> = Vec::new();
    let mut by_subject: HashMap<String, Vec<InboundItem>> = HashMap::new();

    for item in items {
        let key = normalize_subject(&item.subject);
        if !by_subject.contains_key(&key) {
            order.push(key.clone());
        }
        by_subject.entry(key).or_default().push(item);
    }

    order
        .into_iter()
        .map(|key| {
            let mut members = by_subject.remove(&key).unwrap_or_default();
            members.sort_by_key(|item| item.received_time());
            Thread {
                normalized_subject: key,
                items: members,
                score: 0,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceKind;

    fn email(subject: &str, received_at: &str) -> InboundItem {
        InboundItem {
            id: format!("{}|{}", subject, received_at),
            subject: subject.to_string(),
            body: String::new(),
            sender: "someone@example.com".to_string(),
            received_at: received_at.to_string(),
            due: None,
            time: None,
            priority: None,
            source_kind: SourceKind::Email,
        }
    }

    #[test]
    fn test_normalize_strips_stacked_prefixes() {
        assert_eq!(normalize_subject("Re: [EXTERNAL] Re: Fwd: Picnic"), "picnic");
        assert_eq!(normalize_subject("FW: [External] budget"), "budget");
        assert_eq!(normalize_subject("Re: Re: Re: hello"), "hello");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_subject("Re: [EXTERNAL] Re: SACC update");
        assert_eq!(normalize_subject(&once), once);
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize_subject("  field   trip  forms "), "field trip forms");
    }

    #[test]
    fn test_normalize_preserves_mid_subject_re() {
        // "re:" only strips as a prefix; "more: details" keeps its colon.
        assert_eq!(normalize_subject("more: details"), "more: details");
    }

    #[test]
    fn test_grouping_merges_reply_variants() {
        let threads = group(vec![
            email("Picnic", "Sat, 7 Feb 2026 09:00:00 -0500"),
            email("Re: Picnic", "Sun, 8 Feb 2026 09:00:00 -0500"),
            email("Budget", "Sat, 7 Feb 2026 10:00:00 -0500"),
        ]);
        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].normalized_subject, "picnic");
        assert_eq!(threads[0].items.len(), 2);
    }

    #[test]
    fn test_thread_sorted_oldest_first() {
        let threads = group(vec![
            email("Re: Picnic", "Sun, 8 Feb 2026 09:00:00 -0500"),
            email("Picnic", "Sat, 7 Feb 2026 09:00:00 -0500"),
        ]);
        let latest = threads[0].latest().unwrap();
        assert_eq!(latest.subject, "Re: Picnic");
    }

    #[test]
    fn test_undated_items_sort_before_dated() {
        let threads = group(vec![
            email("Picnic", "not a date"),
            email("Re: Picnic", "Sat, 7 Feb 2026 09:00:00 -0500"),
        ]);
        assert_eq!(threads[0].latest().unwrap().subject, "Re: Picnic");
    }
}

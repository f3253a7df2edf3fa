//! Item-level filtering: combines sender and content classification into
//! a keep/drop decision per inbound item.
//!
//! Only email passes through the filter; tasks and calendar events are
//! deliberate user input and are always kept. For email the gates run in
//! order: whitelist override, sender suppression, content suppression,
//! then an urgency gate for neutral senders. Reference extraction happens
//! after the suppression gates so account details in promotional mail are
//! dropped with the mail, but details in a non-urgent personal email are
//! still captured.

use super::content::ContentClassifier;
use super::keywords::URGENCY_WORDS;
use super::sender::SenderClassifier;
use crate::types::{ClassificationVerdict, InboundItem, SourceKind};

/// Result of filtering a batch of inbound items.
#[derive(Debug, Default)]
pub struct FilterOutcome {
    /// Items that survived every gate, input order preserved.
    pub kept: Vec<InboundItem>,
    /// Emails carrying reference information (account numbers,
    /// confirmation codes). Overlaps with `kept`.
    pub reference: Vec<InboundItem>,
}

/// Applies the full classification stack to inbound items.
#[derive(Debug, Clone)]
pub struct ItemFilter {
    sender: SenderClassifier,
    content: ContentClassifier,
    urgency_words: Vec<String>,
}

impl Default for ItemFilter {
    fn default() -> Self {
        Self::new(SenderClassifier::default(), ContentClassifier::default())
    }
}

impl ItemFilter {
    pub fn new(sender: SenderClassifier, content: ContentClassifier) -> Self {
        Self {
            sender,
            content,
            urgency_words: URGENCY_WORDS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Classify a single item without deciding keep/drop.
    pub fn verdict(&self, item: &InboundItem) -> ClassificationVerdict {
        let is_whitelisted = self.sender.is_whitelisted(&item.sender);
        let is_priority_content = self.content.has_priority_signal(&item.subject, &item.body);
        let sender_suppressed = !self.sender.is_trusted(&item.sender);
        let content_suppressed =
            self.content
                .is_suppressible(&item.subject, &item.body, is_whitelisted);
        ClassificationVerdict {
            is_whitelisted,
            is_priority_content,
            is_suppressed: !is_priority_content && (sender_suppressed || content_suppressed),
            is_reference: self.content.is_reference(&item.subject, &item.body),
        }
    }

    fn has_urgency(&self, item: &InboundItem) -> bool {
        let text = item.search_text();
        self.urgency_words.iter().any(|w| text.contains(w.as_str()))
    }

    /// Keep/drop decision for one email.
    ///
    /// Whitelisted or priority-content items are always kept. Suppressed
    /// items are always dropped. What remains is neutral mail, kept only
    /// when it carries an urgency word.
    fn keep_email(&self, item: &InboundItem, verdict: &ClassificationVerdict) -> bool {
        if verdict.is_whitelisted || verdict.is_priority_content {
            return true;
        }
        if verdict.is_suppressed {
            return false;
        }
        self.has_urgency(item)
    }

    /// Filter a batch of items, preserving input order in `kept`.
    pub fn filter(&self, items: Vec<InboundItem>) -> FilterOutcome {
        let mut outcome = FilterOutcome::default();
        for item in items {
            if item.source_kind != SourceKind::Email {
                outcome.kept.push(item);
                continue;
            }
            let verdict = self.verdict(&item);
            // Reference capture sits past the suppression gates: details
            // buried in suppressed promotional mail go down with it.
            if !verdict.is_suppressed && verdict.is_reference {
                outcome.reference.push(item.clone());
            }
            if self.keep_email(&item, &verdict) {
                outcome.kept.push(item);
            } else {
                log::debug!("filtered out email: {}", item.subject);
            }
        }
        outcome
    }
}

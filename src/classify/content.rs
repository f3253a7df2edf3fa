//! Content signal classification, independent of sender.
//!
//! Priority phrases mark genuine time-sensitivity (closures, deadlines,
//! appointments); suppression phrases mark shipping/promotional noise;
//! reference phrases mark account/confirmation details worth keeping.
//! Priority and whitelisting are hard overrides over suppression: false
//! negatives cost more than false positives here.

use super::keywords::{PRIORITY_PHRASES, REFERENCE_PHRASES, SUPPRESSION_PHRASES};

/// Immutable content phrase lists, injected at construction.
#[derive(Debug, Clone)]
pub struct ContentRules {
    pub priority: Vec<String>,
    pub suppression: Vec<String>,
    pub reference: Vec<String>,
}

impl Default for ContentRules {
    fn default() -> Self {
        Self {
            priority: PRIORITY_PHRASES.iter().map(|s| s.to_string()).collect(),
            suppression: SUPPRESSION_PHRASES.iter().map(|s| s.to_string()).collect(),
            reference: REFERENCE_PHRASES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Decides whether a subject+body pair carries priority signal or
/// suppressible noise.
#[derive(Debug, Clone, Default)]
pub struct ContentClassifier {
    rules: ContentRules,
}

impl ContentClassifier {
    pub fn new(rules: ContentRules) -> Self {
        Self { rules }
    }

    fn fold(subject: &str, body: &str) -> String {
        format!("{} {}", subject, body).to_lowercase()
    }

    /// True iff any priority phrase occurs in the case-folded text.
    pub fn has_priority_signal(&self, subject: &str, body: &str) -> bool {
        let text = Self::fold(subject, body);
        self.rules.priority.iter().any(|p| text.contains(p.as_str()))
    }

    /// True iff the item is suppressible noise.
    ///
    /// Whitelisted senders and priority content are never suppressible;
    /// the override check runs before any suppression phrase is consulted.
    pub fn is_suppressible(&self, subject: &str, body: &str, sender_whitelisted: bool) -> bool {
        if sender_whitelisted {
            return false;
        }
        if self.has_priority_signal(subject, body) {
            return false;
        }
        let text = Self::fold(subject, body);
        self.rules
            .suppression
            .iter()
            .any(|p| text.contains(p.as_str()))
    }

    /// True iff the item carries reference information (account numbers,
    /// confirmation codes). Orthogonal to urgency; always computed.
    pub fn is_reference(&self, subject: &str, body: &str) -> bool {
        let text = Self::fold(subject, body);
        self.rules
            .reference
            .iter()
            .any(|p| text.contains(p.as_str()))
    }
}

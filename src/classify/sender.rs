//! Sender trust classification.
//!
//! Three tiers: whitelisted (never suppressed, overrides everything),
//! neutral (no suppression match), suppressed. Pure function of the
//! sender string and the injected rule lists.

use super::keywords::{SUPPRESSED_SENDERS, WHITELIST_DOMAINS};

/// Immutable sender rule lists, injected at construction.
#[derive(Debug, Clone)]
pub struct SenderRules {
    /// Domain substrings whose senders bypass all suppression.
    pub whitelist: Vec<String>,
    /// Sender substrings known to be promotional/automated.
    pub suppressed: Vec<String>,
}

impl Default for SenderRules {
    fn default() -> Self {
        Self {
            whitelist: WHITELIST_DOMAINS.iter().map(|s| s.to_string()).collect(),
            suppressed: SUPPRESSED_SENDERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Decides sender trust from a raw "From" string (display name included).
#[derive(Debug, Clone, Default)]
pub struct SenderClassifier {
    rules: SenderRules,
}

impl SenderClassifier {
    pub fn new(rules: SenderRules) -> Self {
        Self { rules }
    }

    /// True iff any whitelist substring occurs in the lower-cased sender.
    pub fn is_whitelisted(&self, sender: &str) -> bool {
        let sender_lower = sender.to_lowercase();
        self.rules
            .whitelist
            .iter()
            .any(|domain| sender_lower.contains(domain.as_str()))
    }

    /// True if whitelisted, or if no suppression substring matches.
    ///
    /// Whitelist is checked first: a sender matching both lists is
    /// trusted. An unknown sender is trusted by default — missing
    /// something urgent costs more than seeing one extra item.
    pub fn is_trusted(&self, sender: &str) -> bool {
        if self.is_whitelisted(sender) {
            return true;
        }
        let sender_lower = sender.to_lowercase();
        !self
            .rules
            .suppressed
            .iter()
            .any(|pattern| sender_lower.contains(pattern.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitelisted_domain() {
        let c = SenderClassifier::default();
        assert!(c.is_whitelisted("FCPS News <news@fcps.edu>"));
        assert!(c.is_whitelisted("NEWS@FCPS.EDU"));
        assert!(!c.is_whitelisted("deals@bigbox.com"));
    }

    #[test]
    fn test_suppressed_sender_not_trusted() {
        let c = SenderClassifier::default();
        assert!(!c.is_trusted("Motley Fool <daily@motley.fool.com>"));
        assert!(!c.is_trusted("marketing@somebrand.com"));
    }

    #[test]
    fn test_neutral_sender_trusted() {
        let c = SenderClassifier::default();
        assert!(c.is_trusted("Jane Doe <jane.doe@example.com>"));
    }

    #[test]
    fn test_whitelist_defeats_suppression() {
        // A sender matching both lists is trusted: whitelist checked first.
        let rules = SenderRules {
            whitelist: vec!["county.gov".to_string()],
            suppressed: vec!["newsletter@".to_string()],
        };
        let c = SenderClassifier::new(rules);
        assert!(c.is_trusted("newsletter@county.gov"));
        assert!(c.is_whitelisted("newsletter@county.gov"));
    }

    #[test]
    fn test_every_default_whitelist_entry_is_trusted() {
        let c = SenderClassifier::default();
        for domain in WHITELIST_DOMAINS {
            let sender = format!("alerts@{}", domain);
            assert!(c.is_trusted(&sender), "whitelisted sender untrusted: {}", sender);
        }
    }
}

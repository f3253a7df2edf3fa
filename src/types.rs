//! Core data model for a planning run.
//!
//! An `InboundItem` is the uniform shape every source produces. Items are
//! immutable once fetched and discarded at the end of the run; nothing
//! persists across runs, so each plan is rebuilt from scratch.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Which collaborator produced an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceKind {
    Email,
    Task,
    CalendarEvent,
}

impl SourceKind {
    /// Display label used in plan output ("Email" / "Todoist" / "Calendar").
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Email => "Email",
            SourceKind::Task => "Todoist",
            SourceKind::CalendarEvent => "Calendar",
        }
    }
}

/// A raw item fetched from a source, before any classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundItem {
    pub id: String,
    pub subject: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub sender: String,
    /// Raw timestamp string as delivered by the source (RFC 2822 for email).
    /// Parsed lazily so unparseable values can fail open downstream.
    #[serde(default)]
    pub received_at: String,
    /// Source-native due date (tasks and calendar events).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<NaiveDate>,
    /// Display time for calendar events ("09:30 AM" or "All day").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    /// Source-native priority (Todoist 1-4), if the source has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    pub source_kind: SourceKind,
}

impl InboundItem {
    /// Parsed `received_at`, or `None` when the timestamp is malformed.
    pub fn received_time(&self) -> Option<DateTime<Utc>> {
        parse_received_at(&self.received_at)
    }

    /// Lower-cased subject + body, the text every classifier matches on.
    pub fn search_text(&self) -> String {
        let mut text = String::with_capacity(self.subject.len() + self.body.len() + 1);
        text.push_str(&self.subject);
        text.push(' ');
        text.push_str(&self.body);
        text.to_lowercase()
    }
}

/// Parse a source timestamp: RFC 2822 (email Date headers) first, then
/// RFC 3339. Returns `None` rather than erroring — missing information
/// must never silently hide a real item, so callers retain such items.
pub fn parse_received_at(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc2822(trimmed)
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Per-item classification result. Derived on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationVerdict {
    pub is_whitelisted: bool,
    pub is_priority_content: bool,
    pub is_suppressed: bool,
    pub is_reference: bool,
}

/// A group of chronologically related emails sharing a normalized subject.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub normalized_subject: String,
    /// Oldest first.
    pub items: Vec<InboundItem>,
    pub score: i64,
}

impl Thread {
    /// The newest item in the thread.
    pub fn latest(&self) -> Option<&InboundItem> {
        self.items.last()
    }
}

/// Priority tier carried on a plan item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Normal,
    Low,
}

/// The normalized unit placed into a plan bucket.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanItem {
    pub title: String,
    pub source_kind: SourceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    /// Latest sender, retained verbatim for display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Body preview, retained verbatim for display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    pub priority: Priority,
    /// Summarizer output, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub action_items: Vec<String>,
    /// Number of emails behind this item (> 1 for a merged thread).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_count: Option<usize>,
}

/// Counts recorded before any display truncation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanStats {
    pub total_items: usize,
    pub do_now: usize,
    pub do_soon: usize,
    pub monitor: usize,
    pub reference_emails: usize,
    pub threads_analyzed: usize,
}

/// The finished daily plan. Built fresh each run; no cross-run identity.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub do_now: Vec<PlanItem>,
    pub do_soon: Vec<PlanItem>,
    pub monitor: Vec<PlanItem>,
    /// Emails carrying account/confirmation information, kept regardless
    /// of bucket placement (an item may appear here and in a bucket).
    pub reference_items: Vec<InboundItem>,
    pub stats: PlanStats,
    pub generated_at: DateTime<Utc>,
}

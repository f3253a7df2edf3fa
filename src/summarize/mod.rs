//! Thread summarization.
//!
//! The summarizer is best-effort decoration: a plan is complete without
//! it. Every failure path lands on `fallback_analysis`, which flags the
//! thread for manual review instead of guessing.

pub mod openrouter;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PlanningError;
use crate::types::{Priority, Thread};

pub use openrouter::OpenRouterSummarizer;

/// Structured analysis of one email thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadAnalysis {
    pub summary: String,
    /// Where the thread stands ("resolved", "awaiting reply", ...).
    pub outcome: String,
    #[serde(default)]
    pub action_items: Vec<String>,
    #[serde(default)]
    pub follow_up_needed: bool,
    #[serde(default)]
    pub follow_up_reason: Option<String>,
    pub priority: Priority,
    #[serde(default)]
    pub context: Option<String>,
}

/// Produces a `ThreadAnalysis` for a thread.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, thread: &Thread) -> Result<ThreadAnalysis, PlanningError>;
}

/// Deterministic stand-in used when no summarizer is configured or a
/// call fails: the thread subject as the summary, flagged for manual
/// review at medium priority.
pub fn fallback_analysis(thread: &Thread) -> ThreadAnalysis {
    let subject = thread
        .latest()
        .map(|item| item.subject.clone())
        .unwrap_or_else(|| thread.normalized_subject.clone());
    ThreadAnalysis {
        summary: subject,
        outcome: "manual review required".to_string(),
        action_items: Vec::new(),
        follow_up_needed: true,
        follow_up_reason: Some("automatic analysis unavailable".to_string()),
        priority: Priority::Normal,
        context: None,
    }
}

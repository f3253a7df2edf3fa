//! OpenRouter chat-completions summarizer.
//!
//! Sends the full thread (chronological, bodies truncated) to
//! openai/gpt-4o-mini and parses the labelled-line response format
//! (SUMMARY:/OUTCOME:/ACTION ITEMS:/FOLLOW_UP:/PRIORITY:/CONTEXT:).
//! The labelled format survives model drift better than asking for JSON.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{Summarizer, ThreadAnalysis};
use crate::error::PlanningError;
use crate::types::{Priority, Thread};

const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
const MODEL: &str = "openai/gpt-4o-mini";
const MAX_TOKENS: u32 = 500;
const REQUEST_TIMEOUT_SECS: u64 = 30;
/// Per-email body budget in the prompt.
const BODY_CHAR_LIMIT: usize = 800;

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

/// Summarizer backed by the OpenRouter chat-completions API.
pub struct OpenRouterSummarizer {
    api_key: String,
    client: reqwest::Client,
}

impl OpenRouterSummarizer {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn build_prompt(thread: &Thread) -> String {
    let mut context = String::new();
    for (i, email) in thread.items.iter().enumerate() {
        context.push_str(&format!("--- Email {} ---\n", i + 1));
        context.push_str(&format!("From: {}\n", email.sender));
        context.push_str(&format!("Date: {}\n", email.received_at));
        context.push_str(&format!(
            "Content: {}\n\n",
            truncate_chars(&email.body, BODY_CHAR_LIMIT)
        ));
    }

    format!(
        "Analyze this email thread comprehensively and provide actionable insights.\n\n\
         THREAD SUBJECT: {}\n\n\
         THREAD CONTENT (chronological order, oldest to newest):\n{}\n\
         Please analyze this thread and provide:\n\n\
         1. **SUMMARY** (2-3 sentences): What is this conversation about?\n\
         2. **OUTCOME** (1-2 sentences): What has been resolved or decided? If nothing, state \"Ongoing - no resolution yet\"\n\
         3. **ACTION ITEMS** (bullet list): Concrete actions I need to take. If none, state \"None\"\n\
         4. **FOLLOW-UP NEEDED** (Yes/No + reason)\n\
         5. **PRIORITY** (High/Medium/Low + reason)\n\
         6. **KEY CONTEXT** (1 sentence): The most important thing to remember.\n\n\
         Format your response as:\n\
         SUMMARY: [your summary]\n\
         OUTCOME: [outcome or status]\n\
         ACTION ITEMS: [list or \"None\"]\n\
         FOLLOW_UP: [Yes/No - reason]\n\
         PRIORITY: [level - reason]\n\
         CONTEXT: [key context]\n",
        thread.normalized_subject, context
    )
}

/// Parse the labelled-line response. Unknown lines extend the section
/// they follow; a missing label leaves that field at its default.
fn parse_analysis(text: &str) -> ThreadAnalysis {
    let mut analysis = ThreadAnalysis {
        summary: String::new(),
        outcome: String::new(),
        action_items: Vec::new(),
        follow_up_needed: false,
        follow_up_reason: None,
        priority: Priority::Normal,
        context: None,
    };

    #[derive(PartialEq)]
    enum Section {
        None,
        Summary,
        Outcome,
        ActionItems,
        Context,
    }
    let mut section = Section::None;

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix("SUMMARY:") {
            section = Section::Summary;
            analysis.summary = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("OUTCOME:") {
            section = Section::Outcome;
            analysis.outcome = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("ACTION ITEMS:") {
            section = Section::ActionItems;
            let rest = rest.trim();
            if !rest.is_empty() && !rest.eq_ignore_ascii_case("none") {
                analysis.action_items.push(rest.to_string());
            }
        } else if let Some(rest) = line
            .strip_prefix("FOLLOW_UP:")
            .or_else(|| line.strip_prefix("FOLLOW-UP:"))
        {
            section = Section::None;
            let rest = rest.trim();
            analysis.follow_up_needed = rest.to_lowercase().starts_with("yes");
            analysis.follow_up_reason = Some(rest.to_string());
        } else if let Some(rest) = line.strip_prefix("PRIORITY:") {
            section = Section::None;
            let lower = rest.to_lowercase();
            analysis.priority = if lower.contains("high") {
                Priority::High
            } else if lower.contains("low") {
                Priority::Low
            } else {
                Priority::Normal
            };
        } else if let Some(rest) = line.strip_prefix("CONTEXT:") {
            section = Section::Context;
            analysis.context = Some(rest.trim().to_string());
        } else if section == Section::ActionItems
            && (line.starts_with('-') || line.starts_with('*') || line.starts_with('•'))
        {
            let item = line.trim_start_matches(['-', '*', '•', ' ']).trim();
            if !item.is_empty() && !item.eq_ignore_ascii_case("none") {
                analysis.action_items.push(item.to_string());
            }
        } else {
            // Continuation of a prose section.
            match section {
                Section::Summary => {
                    analysis.summary.push(' ');
                    analysis.summary.push_str(line);
                }
                Section::Outcome => {
                    analysis.outcome.push(' ');
                    analysis.outcome.push_str(line);
                }
                Section::Context => {
                    if let Some(context) = analysis.context.as_mut() {
                        context.push(' ');
                        context.push_str(line);
                    }
                }
                _ => {}
            }
        }
    }

    analysis
}

#[async_trait]
impl Summarizer for OpenRouterSummarizer {
    async fn summarize(&self, thread: &Thread) -> Result<ThreadAnalysis, PlanningError> {
        let body = json!({
            "model": MODEL,
            "messages": [{"role": "user", "content": build_prompt(thread)}],
            "max_tokens": MAX_TOKENS,
        });

        let resp = self
            .client
            .post(OPENROUTER_URL)
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .json(&body)
            .send()
            .await
            .map_err(|e| PlanningError::SummarizationUnavailable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(PlanningError::SummarizationUnavailable(format!(
                "OpenRouter error {}: {}",
                status, text
            )));
        }

        let chat: ChatResponse = resp
            .json()
            .await
            .map_err(|e| PlanningError::SummarizationUnavailable(e.to_string()))?;
        let content = chat
            .choices
            .first()
            .map(|c| c.message.content.trim())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| {
                PlanningError::SummarizationUnavailable("response missing choices".to_string())
            })?;

        Ok(parse_analysis(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{InboundItem, SourceKind};

    #[test]
    fn test_parse_full_response() {
        let text = "\
SUMMARY: Field trip permission slip is due Friday.
OUTCOME: Ongoing - no resolution yet
ACTION ITEMS:
- Sign the permission slip
- Send $12 for the bus
FOLLOW_UP: Yes - teacher needs the form back
PRIORITY: High - hard deadline this week
CONTEXT: Second reminder from the teacher.";
        let analysis = parse_analysis(text);
        assert_eq!(analysis.summary, "Field trip permission slip is due Friday.");
        assert_eq!(analysis.outcome, "Ongoing - no resolution yet");
        assert_eq!(
            analysis.action_items,
            vec!["Sign the permission slip", "Send $12 for the bus"]
        );
        assert!(analysis.follow_up_needed);
        assert_eq!(analysis.priority, Priority::High);
        assert_eq!(
            analysis.context.as_deref(),
            Some("Second reminder from the teacher.")
        );
    }

    #[test]
    fn test_parse_multiline_summary() {
        let text = "SUMMARY: First sentence.\nSecond sentence continues.\nOUTCOME: Done";
        let analysis = parse_analysis(text);
        assert_eq!(analysis.summary, "First sentence. Second sentence continues.");
        assert_eq!(analysis.outcome, "Done");
    }

    #[test]
    fn test_parse_none_action_items() {
        let text = "SUMMARY: FYI only.\nACTION ITEMS: None\nPRIORITY: Low - informational";
        let analysis = parse_analysis(text);
        assert!(analysis.action_items.is_empty());
        assert_eq!(analysis.priority, Priority::Low);
    }

    #[test]
    fn test_parse_defaults_on_garbage() {
        let analysis = parse_analysis("the model had a bad day");
        assert!(analysis.summary.is_empty());
        assert_eq!(analysis.priority, Priority::Normal);
        assert!(!analysis.follow_up_needed);
    }

    #[test]
    fn test_prompt_truncates_long_bodies() {
        let thread = Thread {
            normalized_subject: "novel".to_string(),
            items: vec![InboundItem {
                id: "1".to_string(),
                subject: "novel".to_string(),
                body: "x".repeat(5000),
                sender: "author@example.com".to_string(),
                received_at: "Sat, 7 Feb 2026 09:00:00 -0500".to_string(),
                due: None,
                time: None,
                priority: None,
                source_kind: SourceKind::Email,
            }],
            score: 0,
        };
        let prompt = build_prompt(&thread);
        assert!(prompt.len() < 3000);
        assert!(prompt.contains("THREAD SUBJECT: novel"));
    }
}

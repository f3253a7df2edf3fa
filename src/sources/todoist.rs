//! Todoist REST source, plus the daily rollup write-back.
//!
//! Pulls active tasks and maps them onto inbound items. Tasks created by
//! earlier plan runs (the "📋"-titled rollups and the legacy "🎯 TODAY:" /
//! "⏰ SOON:" forms) are excluded so a plan never feeds on its own output.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::ItemSource;
use crate::error::PlanningError;
use crate::render;
use crate::types::{InboundItem, Plan, SourceKind};

const TODOIST_BASE: &str = "https://api.todoist.com/rest/v2";

/// Prefixes of tasks generated by previous runs. "📋 " covers every
/// rollup `post_rollup` creates.
const GENERATED_PREFIXES: &[&str] = &["🎯 TODAY:", "⏰ SOON:", "📋 "];

// ============================================================================
// API response types
// ============================================================================

#[derive(Debug, Deserialize)]
struct TodoistTask {
    id: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    due: Option<TodoistDue>,
    /// 1 (normal) to 4 (urgent).
    #[serde(default)]
    priority: u8,
    #[serde(default)]
    created_at: String,
}

#[derive(Debug, Deserialize)]
struct TodoistDue {
    #[serde(default)]
    date: String,
}

/// Some deployments wrap the task list in `{"results": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TaskListResponse {
    Plain(Vec<TodoistTask>),
    Wrapped { results: Vec<TodoistTask> },
}

impl TaskListResponse {
    fn into_tasks(self) -> Vec<TodoistTask> {
        match self {
            TaskListResponse::Plain(tasks) => tasks,
            TaskListResponse::Wrapped { results } => results,
        }
    }
}

// ============================================================================
// Source
// ============================================================================

/// Todoist active tasks as an item source.
pub struct TodoistSource {
    api_token: String,
}

impl TodoistSource {
    pub fn new(api_token: String) -> Self {
        Self { api_token }
    }

    /// Post the compact daily rollup back to Todoist as a single task.
    /// Best effort: the plan is already complete when this runs, so the
    /// caller only logs failures.
    pub async fn post_rollup(&self, plan: &Plan, today: NaiveDate) -> Result<(), PlanningError> {
        let client = reqwest::Client::new();
        let resp = client
            .post(format!("{}/tasks", TODOIST_BASE))
            .bearer_auth(&self.api_token)
            .json(&rollup_payload(plan, today))
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(PlanningError::CredentialExpired);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PlanningError::SourceUnavailable {
                name: "todoist",
                reason: format!("rollup create failed ({}): {}", status, body),
            });
        }
        log::info!("daily rollup task posted to Todoist");
        Ok(())
    }
}

fn is_generated(content: &str) -> bool {
    GENERATED_PREFIXES.iter().any(|p| content.starts_with(p))
}

/// Request body for the rollup task posted after a run. The title starts
/// with "📋", which `is_generated` recognizes, so the next fetch excludes
/// the task we are about to create.
fn rollup_payload(plan: &Plan, today: NaiveDate) -> serde_json::Value {
    json!({
        "content": render::rollup_title(plan, today),
        "description": render::rollup_description(plan, plan.generated_at),
        "due_string": "today",
    })
}

fn map_task(task: TodoistTask) -> InboundItem {
    let due = task
        .due
        .as_ref()
        .and_then(|d| NaiveDate::parse_from_str(&d.date, "%Y-%m-%d").ok());
    InboundItem {
        id: task.id,
        subject: task.content,
        body: task.description,
        sender: String::new(),
        received_at: task.created_at,
        due,
        time: None,
        priority: Some(task.priority),
        source_kind: SourceKind::Task,
    }
}

#[async_trait]
impl ItemSource for TodoistSource {
    fn name(&self) -> &'static str {
        "todoist"
    }

    async fn fetch(&self, _since: NaiveDate) -> Result<Vec<InboundItem>, PlanningError> {
        let client = reqwest::Client::new();
        let resp = client
            .get(format!("{}/tasks", TODOIST_BASE))
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(PlanningError::CredentialExpired);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PlanningError::SourceUnavailable {
                name: "todoist",
                reason: format!("task list failed ({}): {}", status, body),
            });
        }

        let list: TaskListResponse = resp.json().await?;
        let items: Vec<InboundItem> = list
            .into_tasks()
            .into_iter()
            .filter(|t| !is_generated(&t.content))
            .map(map_task)
            .collect();
        log::info!("todoist: fetched {} tasks", items.len());
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::types::{PlanItem, PlanStats, Priority};
    use chrono::{DateTime, Utc};

    #[test]
    fn test_generated_tasks_filtered() {
        assert!(is_generated("🎯 TODAY: call the dentist | + 2 more"));
        assert!(is_generated("📋 Daily Plan - Feb 9"));
        assert!(is_generated("📋 Feb 9 | • sign slip"));
        assert!(!is_generated("call the dentist"));
    }

    #[test]
    fn test_rollup_payload_is_excluded_by_next_fetch() {
        let plan = Plan {
            do_now: vec![PlanItem {
                title: "Permission slip".to_string(),
                source_kind: SourceKind::Email,
                due: None,
                time: None,
                from: None,
                preview: None,
                priority: Priority::High,
                summary: None,
                action_items: vec!["sign the slip".to_string()],
                email_count: None,
            }],
            do_soon: vec![],
            monitor: vec![],
            reference_items: vec![],
            stats: PlanStats {
                total_items: 1,
                do_now: 1,
                ..PlanStats::default()
            },
            generated_at: DateTime::parse_from_rfc3339("2026-02-09T11:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        };
        let today = NaiveDate::from_ymd_opt(2026, 2, 9).unwrap();
        let payload = rollup_payload(&plan, today);

        let content = payload["content"].as_str().unwrap();
        assert!(content.starts_with("📋 Feb 9"));
        assert!(content.contains("• sign the slip"));
        // The task this payload creates must not feed the next run.
        assert!(is_generated(content));
        assert_eq!(payload["due_string"], "today");
        assert!(payload["description"]
            .as_str()
            .unwrap()
            .contains("NEEDS ATTENTION"));
    }

    #[test]
    fn test_map_task_parses_due_and_priority() {
        let task: TodoistTask = serde_json::from_str(
            r#"{
                "id": "42",
                "content": "Renew car registration",
                "description": "DMV site",
                "due": {"date": "2026-02-11"},
                "priority": 4,
                "created_at": "2026-02-01T09:00:00Z"
            }"#,
        )
        .unwrap();
        let item = map_task(task);
        assert_eq!(item.due, NaiveDate::from_ymd_opt(2026, 2, 11));
        assert_eq!(item.priority, Some(4));
        assert_eq!(item.source_kind, SourceKind::Task);
        assert_eq!(item.subject, "Renew car registration");
    }

    #[test]
    fn test_plain_and_wrapped_responses() {
        let plain: TaskListResponse =
            serde_json::from_str(r#"[{"id": "1", "content": "a"}]"#).unwrap();
        assert_eq!(plain.into_tasks().len(), 1);

        let wrapped: TaskListResponse =
            serde_json::from_str(r#"{"results": [{"id": "1", "content": "a"}]}"#).unwrap();
        assert_eq!(wrapped.into_tasks().len(), 1);
    }

    #[test]
    fn test_missing_due_is_none() {
        let task: TodoistTask =
            serde_json::from_str(r#"{"id": "7", "content": "someday"}"#).unwrap();
        assert!(map_task(task).due.is_none());
    }
}

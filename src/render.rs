//! Plan output: markdown daily note, compact task rollup, JSON artifact.
//!
//! Three surfaces, one plan. The markdown note is the human-readable
//! record; the rollup is a single short task title ("📋 Feb 9 | sign
//! slip | call DMV | + 2 more") with the full breakdown in its
//! description; the JSON artifact is the machine-readable archive,
//! timestamped so runs never overwrite each other.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::PlanningError;
use crate::types::{Plan, PlanItem};

/// Top actions shown verbatim in the rollup title before "+ N more".
const TITLE_ACTION_LIMIT: usize = 3;

fn item_line(item: &PlanItem) -> String {
    let mut line = format!("- **{}** ({})", item.title, item.source_kind.label());
    if let Some(due) = item.due {
        line.push_str(&format!(" — due {}", due.format("%b %-d")));
    }
    if let Some(time) = &item.time {
        line.push_str(&format!(" — {}", time));
    }
    if let Some(from) = &item.from {
        line.push_str(&format!("\n  - From: {}", from));
    }
    if let Some(summary) = &item.summary {
        line.push_str(&format!("\n  - {}", summary));
    }
    for action in &item.action_items {
        line.push_str(&format!("\n  - [ ] {}", action));
    }
    if let Some(count) = item.email_count {
        line.push_str(&format!("\n  - {} emails in thread", count));
    }
    line
}

fn section(out: &mut String, heading: &str, items: &[PlanItem]) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("## {}\n\n", heading));
    for item in items {
        out.push_str(&item_line(item));
        out.push('\n');
    }
    out.push('\n');
}

/// Render the plan as a daily-note markdown body.
pub fn markdown_note(plan: &Plan, today: NaiveDate) -> String {
    let mut out = format!("# Daily Plan — {}\n\n", today.format("%A, %B %-d, %Y"));
    section(&mut out, "🔴 Do Now", &plan.do_now);
    section(&mut out, "🟡 Do Soon", &plan.do_soon);
    section(&mut out, "👀 Monitor", &plan.monitor);

    if !plan.reference_items.is_empty() {
        out.push_str("## 📎 Reference\n\n");
        for item in &plan.reference_items {
            out.push_str(&format!("- {} — {}\n", item.subject, item.sender));
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "---\n{} items | {} threads analyzed | generated {}\n",
        plan.stats.total_items,
        plan.stats.threads_analyzed,
        plan.generated_at.format("%Y-%m-%d %H:%M UTC")
    ));
    out
}

/// Compact rollup title: "📋 Feb 9 | first action | second | + N more".
pub fn rollup_title(plan: &Plan, today: NaiveDate) -> String {
    let mut parts = vec![format!("📋 {}", today.format("%b %-d"))];

    let actions: Vec<&String> = plan
        .do_now
        .iter()
        .flat_map(|item| item.action_items.first())
        .collect();
    for action in actions.iter().take(TITLE_ACTION_LIMIT) {
        parts.push(format!("• {}", action));
    }
    if actions.len() > TITLE_ACTION_LIMIT {
        parts.push(format!("+ {} more", actions.len() - TITLE_ACTION_LIMIT));
    }
    if actions.is_empty() {
        parts.push(format!("{} items to review", plan.stats.do_now));
    }
    parts.join(" | ")
}

/// Detailed rollup description: the do_now breakdown plus today's tasks
/// and events.
pub fn rollup_description(plan: &Plan, generated_at: DateTime<Utc>) -> String {
    let mut parts = vec![
        format!("Generated: {}", generated_at.format("%I:%M %p")),
        format!("Analyzed: {} email threads", plan.stats.threads_analyzed),
    ];

    let emails: Vec<&PlanItem> = plan
        .do_now
        .iter()
        .filter(|i| i.source_kind == crate::types::SourceKind::Email)
        .collect();
    if !emails.is_empty() {
        parts.push("\nNEEDS ATTENTION".to_string());
        for (i, item) in emails.iter().enumerate() {
            parts.push(format!("\n{}. {}", i + 1, item.title));
            if let Some(from) = &item.from {
                let name = from.split('<').next().unwrap_or(from).trim();
                parts.push(format!("   From: {}", name));
            }
            if let Some(first) = item.action_items.first() {
                parts.push(format!("   DO: {}", first));
            }
        }
    }

    let rest: Vec<&PlanItem> = plan
        .do_now
        .iter()
        .filter(|i| i.source_kind != crate::types::SourceKind::Email)
        .collect();
    if !rest.is_empty() {
        parts.push("\nTODAY".to_string());
        for item in rest {
            match &item.time {
                Some(time) => parts.push(format!("• {}: {}", time, item.title)),
                None => parts.push(format!("• {}", item.title)),
            }
        }
    }

    parts.join("\n")
}

/// Write the timestamped JSON artifact; returns the path written.
pub fn write_artifact(plan: &Plan, output_dir: &Path) -> Result<PathBuf, PlanningError> {
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(format!(
        "daily_plan_{}.json",
        plan.generated_at.format("%Y%m%d_%H%M%S")
    ));
    std::fs::write(&path, serde_json::to_string_pretty(plan)?)?;
    log::info!("plan artifact written to {}", path.display());
    Ok(path)
}

//! Planning run orchestration.
//!
//! A run is: fetch from every source concurrently, classify and filter,
//! prune stale and duplicate notices, group emails into threads, score
//! and keep the top threads, summarize them, and assemble the tiered
//! plan. The engine stages (`prepare`, `assemble`) are synchronous and
//! deterministic for a fixed clock; only fetching and summarization are
//! async.
//!
//! One run at a time: an overlapping invocation fails fast with
//! `AlreadyRunning` instead of queueing, since the next scheduled run
//! will see the same inputs anyway.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::bucketize::PlanBucketizer;
use crate::classify::{ContentClassifier, ItemFilter, SenderClassifier, SenderRules};
use crate::config::AppConfig;
use crate::dedup;
use crate::error::PlanningError;
use crate::sources::ItemSource;
use crate::summarize::{fallback_analysis, Summarizer, ThreadAnalysis};
use crate::threads::{grouper, ThreadScorer};
use crate::types::{InboundItem, Plan, PlanItem, Priority, SourceKind, Thread};

/// Intermediate state between the pure engine stages.
struct PreparedItems {
    threads: Vec<Thread>,
    tasks: Vec<InboundItem>,
    events: Vec<InboundItem>,
    reference: Vec<InboundItem>,
}

/// Drives a complete planning run.
pub struct Planner {
    config: AppConfig,
    filter: ItemFilter,
    scorer: ThreadScorer,
    sources: Vec<Arc<dyn ItemSource>>,
    summarizer: Option<Arc<dyn Summarizer>>,
    run_lock: Mutex<()>,
}

impl Planner {
    pub fn new(
        config: AppConfig,
        sources: Vec<Arc<dyn ItemSource>>,
        summarizer: Option<Arc<dyn Summarizer>>,
    ) -> Self {
        // Config-supplied sender rules merge over the built-in lists.
        let mut sender_rules = SenderRules::default();
        sender_rules
            .whitelist
            .extend(config.extra_whitelist.iter().map(|s| s.to_lowercase()));
        sender_rules.suppressed.extend(
            config
                .extra_suppressed_senders
                .iter()
                .map(|s| s.to_lowercase()),
        );

        let filter = ItemFilter::new(
            SenderClassifier::new(sender_rules.clone()),
            ContentClassifier::default(),
        );
        let scorer = ThreadScorer::new(
            SenderClassifier::new(sender_rules),
            ContentClassifier::default(),
        );

        Self {
            config,
            filter,
            scorer,
            sources,
            summarizer,
            run_lock: Mutex::new(()),
        }
    }

    /// Execute one planning run against the current clock.
    pub async fn run(&self) -> Result<Plan, PlanningError> {
        self.run_at(Utc::now(), chrono::Local::now().date_naive())
            .await
    }

    /// Execute one planning run with an explicit clock. The engine is
    /// deterministic for a fixed `now`/`today` and fixed source output.
    pub async fn run_at(&self, now: DateTime<Utc>, today: NaiveDate) -> Result<Plan, PlanningError> {
        let _guard = self
            .run_lock
            .try_lock()
            .map_err(|_| PlanningError::AlreadyRunning)?;

        let deadline = Instant::now() + Duration::from_secs(self.config.run_timeout_secs);

        log::info!("planning run started ({} sources)", self.sources.len());
        let items = self.fetch_all(today, deadline).await?;
        log::info!("fetched {} items across all sources", items.len());

        let PreparedItems {
            threads,
            tasks,
            events,
            reference,
        } = self.prepare(items, now);
        let analyzed = self.summarize_threads(threads, deadline).await;
        let plan = self.assemble(analyzed, tasks, events, reference, today, now);
        log::info!(
            "plan assembled: {} do_now, {} do_soon, {} monitor",
            plan.stats.do_now,
            plan.stats.do_soon,
            plan.stats.monitor
        );
        Ok(plan)
    }

    /// Fan out to all sources concurrently, bounded by the run deadline.
    /// A failed or timed-out source contributes nothing; the run only
    /// fails when every source failed. `CredentialExpired` propagates —
    /// no later run can succeed without the user re-authorizing.
    async fn fetch_all(
        &self,
        since_anchor: NaiveDate,
        deadline: Instant,
    ) -> Result<Vec<InboundItem>, PlanningError> {
        let email_since =
            since_anchor - chrono::Duration::days(i64::from(self.config.email_lookback_days));

        let mut set: JoinSet<(&'static str, Result<Vec<InboundItem>, PlanningError>)> =
            JoinSet::new();
        for source in &self.sources {
            let source = Arc::clone(source);
            let since = if source.name() == "calendar" {
                since_anchor
            } else {
                email_since
            };
            set.spawn(async move { (source.name(), source.fetch(since).await) });
        }

        let mut items = Vec::new();
        let mut successes = 0usize;
        let mut failures = 0usize;
        loop {
            let joined = match tokio::time::timeout_at(deadline, set.join_next()).await {
                Ok(Some(joined)) => joined,
                Ok(None) => break,
                Err(_) => {
                    log::warn!("fetch phase hit the run deadline; continuing with partial results");
                    set.abort_all();
                    break;
                }
            };
            match joined {
                Ok((name, Ok(fetched))) => {
                    log::debug!("{}: {} items", name, fetched.len());
                    successes += 1;
                    items.extend(fetched);
                }
                Ok((_, Err(PlanningError::CredentialExpired))) => {
                    return Err(PlanningError::CredentialExpired);
                }
                Ok((name, Err(e))) => {
                    log::warn!("{} unavailable this run: {}", name, e);
                    failures += 1;
                }
                Err(e) => {
                    log::warn!("source task failed: {}", e);
                    failures += 1;
                }
            }
        }

        if successes == 0 && failures > 0 && items.is_empty() {
            return Err(PlanningError::EmptyRun);
        }
        Ok(items)
    }

    /// Synchronous engine core: filter, prune, group, score, cut.
    fn prepare(&self, items: Vec<InboundItem>, now: DateTime<Utc>) -> PreparedItems {
        let outcome = self.filter.filter(items);
        let reference = outcome.reference;

        let mut emails = Vec::new();
        let mut tasks = Vec::new();
        let mut events = Vec::new();
        for item in outcome.kept {
            match item.source_kind {
                SourceKind::Email => emails.push(item),
                SourceKind::Task => tasks.push(item),
                SourceKind::CalendarEvent => events.push(item),
            }
        }

        let emails = dedup::prune(emails, now);
        let threads = grouper::group(emails);
        let threads = self.scorer.rank(threads, self.config.max_threads);

        PreparedItems {
            threads,
            tasks,
            events,
            reference,
        }
    }

    /// Summarize ranked threads with bounded concurrency. Any individual
    /// failure or deadline overrun falls back to the deterministic
    /// analysis; this phase cannot fail the run.
    async fn summarize_threads(
        &self,
        threads: Vec<Thread>,
        deadline: Instant,
    ) -> Vec<(Thread, ThreadAnalysis)> {
        let summarizer = match &self.summarizer {
            Some(s) => Arc::clone(s),
            None => {
                return threads
                    .into_iter()
                    .map(|t| {
                        let analysis = fallback_analysis(&t);
                        (t, analysis)
                    })
                    .collect();
            }
        };

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut set: JoinSet<(usize, Thread, ThreadAnalysis)> = JoinSet::new();
        for (idx, thread) in threads.into_iter().enumerate() {
            let summarizer = Arc::clone(&summarizer);
            let semaphore = Arc::clone(&semaphore);
            set.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    let analysis = fallback_analysis(&thread);
                    return (idx, thread, analysis);
                };
                let analysis = match tokio::time::timeout_at(
                    deadline,
                    summarizer.summarize(&thread),
                )
                .await
                {
                    Ok(Ok(analysis)) => analysis,
                    Ok(Err(e)) => {
                        log::warn!(
                            "summarization failed for '{}': {}",
                            thread.normalized_subject,
                            e
                        );
                        fallback_analysis(&thread)
                    }
                    Err(_) => {
                        log::warn!(
                            "summarization deadline hit for '{}'",
                            thread.normalized_subject
                        );
                        fallback_analysis(&thread)
                    }
                };
                (idx, thread, analysis)
            });
        }

        let mut analyzed = Vec::new();
        while let Some(joined) = set.join_next().await {
            if let Ok(entry) = joined {
                analyzed.push(entry);
            }
        }
        // Restore thread-score order.
        analyzed.sort_by_key(|(idx, _, _)| *idx);
        analyzed
            .into_iter()
            .map(|(_, thread, analysis)| (thread, analysis))
            .collect()
    }

    /// Turn prepared items and analyses into the final tiered plan.
    fn assemble(
        &self,
        analyzed: Vec<(Thread, ThreadAnalysis)>,
        tasks: Vec<InboundItem>,
        events: Vec<InboundItem>,
        reference: Vec<InboundItem>,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Plan {
        let threads_analyzed = analyzed.len();
        let mut plan_items = Vec::new();

        // Emails first (descending thread score), then tasks, then events.
        for (thread, analysis) in analyzed {
            plan_items.push(email_plan_item(&thread, analysis));
        }
        for task in &tasks {
            plan_items.push(task_plan_item(task));
        }
        for event in &events {
            plan_items.push(event_plan_item(event));
        }

        let bucketizer =
            PlanBucketizer::new(self.config.do_now_email_cap, self.config.do_soon_cap);
        let buckets = bucketizer.bucketize(plan_items, today);

        let mut stats = buckets.stats;
        stats.reference_emails = reference.len();
        stats.threads_analyzed = threads_analyzed;

        Plan {
            do_now: buckets.do_now,
            do_soon: buckets.do_soon,
            monitor: buckets.monitor,
            reference_items: reference,
            stats,
            generated_at: now,
        }
    }
}

fn preview(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    let snippet: String = trimmed.chars().take(200).collect();
    Some(snippet)
}

fn email_plan_item(thread: &Thread, analysis: ThreadAnalysis) -> PlanItem {
    let latest = thread.latest();
    PlanItem {
        title: latest
            .map(|item| item.subject.clone())
            .unwrap_or_else(|| thread.normalized_subject.clone()),
        source_kind: SourceKind::Email,
        due: None,
        time: None,
        from: latest.map(|item| item.sender.clone()),
        preview: latest.and_then(|item| preview(&item.body)),
        priority: analysis.priority,
        summary: Some(analysis.summary).filter(|s| !s.is_empty()),
        action_items: analysis.action_items,
        email_count: (thread.items.len() > 1).then_some(thread.items.len()),
    }
}

fn task_plan_item(task: &InboundItem) -> PlanItem {
    // Todoist priority 4 is "urgent" in the UI.
    let priority = match task.priority {
        Some(4) => Priority::High,
        _ => Priority::Normal,
    };
    PlanItem {
        title: task.subject.clone(),
        source_kind: SourceKind::Task,
        due: task.due,
        time: None,
        from: None,
        preview: preview(&task.body),
        priority,
        summary: None,
        action_items: Vec::new(),
        email_count: None,
    }
}

fn event_plan_item(event: &InboundItem) -> PlanItem {
    PlanItem {
        title: event.subject.clone(),
        source_kind: SourceKind::CalendarEvent,
        due: event.due,
        time: event.time.clone(),
        from: None,
        preview: None,
        priority: Priority::Normal,
        summary: None,
        action_items: Vec::new(),
        email_count: None,
    }
}

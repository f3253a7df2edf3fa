//! End-to-end planning runs over fixture sources.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use daybrief::config::AppConfig;
use daybrief::error::PlanningError;
use daybrief::pipeline::Planner;
use daybrief::sources::ItemSource;
use daybrief::threads::normalize_subject;
use daybrief::types::{InboundItem, Plan, SourceKind};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 9, 12, 0, 0).unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 9).unwrap()
}

fn email(id: &str, subject: &str, body: &str, sender: &str, received_at: &str) -> InboundItem {
    InboundItem {
        id: id.to_string(),
        subject: subject.to_string(),
        body: body.to_string(),
        sender: sender.to_string(),
        received_at: received_at.to_string(),
        due: None,
        time: None,
        priority: None,
        source_kind: SourceKind::Email,
    }
}

fn task(id: &str, subject: &str, due: Option<NaiveDate>, priority: u8) -> InboundItem {
    InboundItem {
        id: id.to_string(),
        subject: subject.to_string(),
        body: String::new(),
        sender: String::new(),
        received_at: String::new(),
        due,
        time: None,
        priority: Some(priority),
        source_kind: SourceKind::Task,
    }
}

struct FixtureSource {
    items: Vec<InboundItem>,
}

#[async_trait]
impl ItemSource for FixtureSource {
    fn name(&self) -> &'static str {
        "fixture"
    }

    async fn fetch(&self, _since: NaiveDate) -> Result<Vec<InboundItem>, PlanningError> {
        Ok(self.items.clone())
    }
}

struct FailingSource {
    error: fn() -> PlanningError,
}

#[async_trait]
impl ItemSource for FailingSource {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn fetch(&self, _since: NaiveDate) -> Result<Vec<InboundItem>, PlanningError> {
        Err((self.error)())
    }
}

async fn run_with(items: Vec<InboundItem>) -> Plan {
    let planner = Planner::new(
        AppConfig::default(),
        vec![Arc::new(FixtureSource { items })],
        None,
    );
    planner.run_at(now(), today()).await.unwrap()
}

fn all_titles(plan: &Plan) -> Vec<&str> {
    plan.do_now
        .iter()
        .chain(plan.do_soon.iter())
        .chain(plan.monitor.iter())
        .map(|i| i.title.as_str())
        .collect()
}

#[tokio::test]
async fn whitelisted_sender_survives_suppression_patterns() {
    // Sender matches a suppression substring (newsletter@) but the
    // domain is whitelisted.
    let plan = run_with(vec![email(
        "1",
        "Save up to 50% on spirit wear",
        "flash sale in the school store",
        "newsletter@fcps.edu",
        "Mon, 9 Feb 2026 08:00:00 -0500",
    )])
    .await;
    assert_eq!(plan.stats.do_now, 1);
}

#[tokio::test]
async fn priority_content_defeats_suppression_phrases() {
    // Promotional wrapper around a genuinely urgent notice.
    let plan = run_with(vec![
        email(
            "1",
            "Registration due Friday",
            "limited time offer: renew now, registration due this week",
            "promo@afterschool-vendor.com",
            "Mon, 9 Feb 2026 08:00:00 -0500",
        ),
        email(
            "2",
            "Flash sale ends tonight",
            "save up to 70% on everything, shop now",
            "promo@afterschool-vendor.com",
            "Mon, 9 Feb 2026 08:05:00 -0500",
        ),
    ])
    .await;
    let titles = all_titles(&plan);
    assert!(titles.contains(&"Registration due Friday"));
    assert!(!titles.iter().any(|t| t.contains("Flash sale")));
}

#[test]
fn subject_normalization_is_idempotent() {
    let subjects = [
        "Re: [EXTERNAL] Re: Field trip",
        "FW: [External] FWD: Budget",
        "plain subject",
        "Re:    spaced   out   ",
    ];
    for subject in subjects {
        let once = normalize_subject(subject);
        assert_eq!(normalize_subject(&once), once, "not idempotent: {}", subject);
    }
}

#[tokio::test]
async fn update_notice_supersedes_original() {
    let plan = run_with(vec![
        email(
            "1",
            "School Closed Today",
            "all schools closed",
            "alerts@fcps.edu",
            "2026-02-09T06:00:00Z",
        ),
        email(
            "2",
            "UPDATE: School Closed Today - Early Dismissal",
            "schools will dismiss two hours early instead",
            "alerts@fcps.edu",
            "2026-02-09T10:00:00Z",
        ),
    ])
    .await;
    let titles = all_titles(&plan);
    assert_eq!(
        titles,
        vec!["UPDATE: School Closed Today - Early Dismissal"]
    );
    assert_eq!(plan.stats.do_now, 1);
}

#[tokio::test]
async fn freshness_windows_differ_for_school_and_general_mail() {
    // Both 30 hours old. The school delay notice is past its 24-hour
    // window; the general deadline email is inside its 48-hour window.
    let plan = run_with(vec![
        email(
            "1",
            "Two-Hour Delay for Schools",
            "school delay tomorrow morning",
            "alerts@fcps.edu",
            "2026-02-08T06:00:00Z",
        ),
        email(
            "2",
            "Insurance paperwork",
            "the deadline for the claim form is approaching",
            "agent@insurer.example.com",
            "2026-02-08T06:00:00Z",
        ),
    ])
    .await;
    let titles = all_titles(&plan);
    assert!(!titles.iter().any(|t| t.contains("Delay")));
    assert!(titles.contains(&"Insurance paperwork"));
}

#[tokio::test]
async fn reply_chain_collapses_to_one_scored_item() {
    let plan = run_with(vec![
        email(
            "1",
            "Field trip permission slip",
            "please sign the permission slip by Friday",
            "teacher@school-pta.example.com",
            "Sat, 7 Feb 2026 09:00:00 -0500",
        ),
        email(
            "2",
            "Re: Field trip permission slip",
            "we still need the form",
            "teacher@school-pta.example.com",
            "Sun, 8 Feb 2026 09:00:00 -0500",
        ),
        email(
            "3",
            "Re: Re: Field trip permission slip",
            "last call for forms",
            "teacher@school-pta.example.com",
            "Mon, 9 Feb 2026 09:00:00 -0500",
        ),
    ])
    .await;

    assert_eq!(plan.stats.threads_analyzed, 1);
    assert_eq!(plan.do_now.len(), 1);
    let item = &plan.do_now[0];
    // Newest email heads the merged item.
    assert_eq!(item.title, "Re: Re: Field trip permission slip");
    assert_eq!(item.email_count, Some(3));
}

#[tokio::test]
async fn whitelisted_promotional_email_still_reaches_do_now() {
    let plan = run_with(vec![email(
        "1",
        "Spirit wear sale",
        "discount on hoodies, shop now, free shipping",
        "pta-store@fcps.edu",
        "Mon, 9 Feb 2026 08:00:00 -0500",
    )])
    .await;
    assert_eq!(plan.do_now.len(), 1);
    assert_eq!(plan.do_now[0].title, "Spirit wear sale");
}

#[tokio::test]
async fn identical_inputs_produce_identical_stats() {
    let items = vec![
        email(
            "1",
            "School Closed Today",
            "all schools closed",
            "alerts@fcps.edu",
            "2026-02-09T06:00:00Z",
        ),
        email(
            "2",
            "Please confirm pickup time",
            "please respond and confirm by today",
            "coach@example.com",
            "2026-02-09T07:00:00Z",
        ),
        task("3", "Renew registration", Some(today()), 4),
        task("4", "Garage shelves", None, 1),
    ];
    let first = run_with(items.clone()).await;
    let second = run_with(items).await;
    assert_eq!(first.stats, second.stats);
}

#[tokio::test]
async fn tasks_and_events_bucket_by_due_date() {
    let future = NaiveDate::from_ymd_opt(2026, 2, 13).unwrap();
    let overdue = NaiveDate::from_ymd_opt(2026, 2, 7).unwrap();
    let mut event = email("e", "Dentist", "", "", "");
    event.source_kind = SourceKind::CalendarEvent;
    event.due = Some(today());
    event.time = Some("09:30 AM".to_string());

    let plan = run_with(vec![
        task("1", "Renew registration", Some(today()), 4),
        task("2", "Book flights", Some(future), 1),
        task("3", "Garage shelves", None, 1),
        task("4", "File claim form", Some(overdue), 1),
        event,
    ])
    .await;

    let do_now = all_section(&plan.do_now);
    assert!(do_now.contains(&"Renew registration"));
    assert!(do_now.contains(&"Dentist"));
    // Only an exact-today due date is a do_now item; a missed date needs
    // rescheduling, not a same-day slot.
    assert_eq!(
        all_section(&plan.do_soon),
        vec!["Book flights", "File claim form"]
    );
    assert_eq!(all_section(&plan.monitor), vec!["Garage shelves"]);
}

fn all_section(items: &[daybrief::types::PlanItem]) -> Vec<&str> {
    items.iter().map(|i| i.title.as_str()).collect()
}

#[tokio::test]
async fn reference_emails_collected_alongside_buckets() {
    let plan = run_with(vec![email(
        "1",
        "Your HOA account",
        "account number: 5531-8 — dues deadline is today",
        "manager@hoa.example.com",
        "2026-02-09T08:00:00Z",
    )])
    .await;
    // Urgent (deadline/today) and carries reference info: both places.
    assert_eq!(plan.stats.reference_emails, 1);
    assert_eq!(plan.reference_items[0].subject, "Your HOA account");
    assert_eq!(plan.do_now.len(), 1);
}

#[tokio::test]
async fn failed_source_degrades_instead_of_failing_run() {
    let planner = Planner::new(
        AppConfig::default(),
        vec![
            Arc::new(FixtureSource {
                items: vec![task("1", "Renew registration", Some(today()), 4)],
            }),
            Arc::new(FailingSource {
                error: || PlanningError::SourceUnavailable {
                    name: "todoist",
                    reason: "503".to_string(),
                },
            }),
        ],
        None,
    );
    let plan = planner.run_at(now(), today()).await.unwrap();
    assert_eq!(plan.stats.total_items, 1);
}

#[tokio::test]
async fn expired_credentials_abort_the_run() {
    let planner = Planner::new(
        AppConfig::default(),
        vec![
            Arc::new(FixtureSource {
                items: vec![task("1", "Renew registration", Some(today()), 4)],
            }),
            Arc::new(FailingSource {
                error: || PlanningError::CredentialExpired,
            }),
        ],
        None,
    );
    let err = planner.run_at(now(), today()).await.unwrap_err();
    assert!(matches!(err, PlanningError::CredentialExpired));
}

#[tokio::test]
async fn all_sources_failing_is_an_empty_run() {
    let planner = Planner::new(
        AppConfig::default(),
        vec![Arc::new(FailingSource {
            error: || PlanningError::SourceUnavailable {
                name: "gmail",
                reason: "down".to_string(),
            },
        })],
        None,
    );
    let err = planner.run_at(now(), today()).await.unwrap_err();
    assert!(matches!(err, PlanningError::EmptyRun));
}

#[tokio::test]
async fn config_sender_overrides_extend_the_builtin_lists() {
    let mut config = AppConfig::default();
    config.extra_whitelist = vec!["Trusted.Example.Com".to_string()];
    config.extra_suppressed_senders = vec!["noisy.example.com".to_string()];
    let items = vec![
        email(
            "1",
            "Carpool question",
            "no rush on this one",
            "parent@trusted.example.com",
            "2026-02-09T08:00:00Z",
        ),
        email(
            "2",
            "Your listing renewal due",
            "the renewal due date for your listing is this week",
            "bot@noisy.example.com",
            "2026-02-09T08:05:00Z",
        ),
    ];
    let planner = Planner::new(config, vec![Arc::new(FixtureSource { items })], None);
    let plan = planner.run_at(now(), today()).await.unwrap();
    let titles = all_titles(&plan);
    // Whitelisted sender kept despite no urgency; priority phrasing from
    // the suppressed sender still wins over the suppression list.
    assert!(titles.contains(&"Carpool question"));
    assert!(titles.contains(&"Your listing renewal due"));
}

#[tokio::test]
async fn suppressed_sender_override_drops_neutral_mail() {
    let mut config = AppConfig::default();
    config.extra_suppressed_senders = vec!["noisy.example.com".to_string()];
    let items = vec![email(
        "1",
        "Weekly roundup",
        "here is what happened this week",
        "digest@noisy.example.com",
        "2026-02-09T08:00:00Z",
    )];
    let planner = Planner::new(config, vec![Arc::new(FixtureSource { items })], None);
    let plan = planner.run_at(now(), today()).await.unwrap();
    assert!(all_titles(&plan).is_empty());
}

#[tokio::test]
async fn thread_cutoff_limits_analysis_not_discovery() {
    let mut config = AppConfig::default();
    config.max_threads = 3;
    let items: Vec<InboundItem> = (0..10)
        .map(|i| {
            email(
                &format!("m{}", i),
                &format!("Question {} needs a response", i),
                "please respond by today",
                "parent@example.com",
                "2026-02-09T08:00:00Z",
            )
        })
        .collect();
    let planner = Planner::new(config, vec![Arc::new(FixtureSource { items })], None);
    let plan = planner.run_at(now(), today()).await.unwrap();
    assert_eq!(plan.stats.threads_analyzed, 3);
    assert_eq!(plan.do_now.len(), 3);
}

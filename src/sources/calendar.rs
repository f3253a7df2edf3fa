//! Google Calendar API v3 source.
//!
//! Fetches events over the configured horizon (singleEvents, ordered by
//! start time). Attendee-less birthday and anniversary reminders are
//! skipped; they recur forever and never need action. Event start times
//! render as "09:30 AM" for timed events or "All day" for date-only
//! events.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate};
use serde::Deserialize;

use super::ItemSource;
use crate::auth;
use crate::error::PlanningError;
use crate::types::{InboundItem, SourceKind};

const CALENDAR_EVENTS_URL: &str =
    "https://www.googleapis.com/calendar/v3/calendars/primary/events";

/// Self-celebrating reminders to drop when nobody else is invited.
const REMINDER_KEYWORDS: &[&str] = &["birthday", "anniversary"];

// ============================================================================
// API response types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListResponse {
    #[serde(default)]
    items: Vec<EventRaw>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventRaw {
    #[serde(default)]
    id: String,
    #[serde(default)]
    summary: Option<String>,
    start: Option<EventDateTime>,
    #[serde(default)]
    attendees: Vec<Attendee>,
    organizer: Option<Organizer>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventDateTime {
    date_time: Option<String>,
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Attendee {
    #[serde(default)]
    email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Organizer {
    #[serde(default)]
    email: String,
}

// ============================================================================
// Source
// ============================================================================

/// Primary Google Calendar as an item source.
pub struct CalendarSource {
    horizon_days: u32,
}

impl CalendarSource {
    pub fn new(horizon_days: u32) -> Self {
        Self { horizon_days }
    }
}

fn is_skippable_reminder(event: &EventRaw) -> bool {
    let summary = event.summary.as_deref().unwrap_or("").to_lowercase();
    REMINDER_KEYWORDS.iter().any(|k| summary.contains(k)) && event.attendees.len() <= 1
}

fn map_event(event: EventRaw) -> Option<InboundItem> {
    let start = event.start?;
    let (due, time, received_at) = match (&start.date_time, &start.date) {
        (Some(dt), _) => {
            let parsed = DateTime::parse_from_rfc3339(dt).ok()?;
            (
                Some(parsed.date_naive()),
                Some(parsed.format("%I:%M %p").to_string()),
                dt.clone(),
            )
        }
        (None, Some(date)) => {
            let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
            (Some(parsed), Some("All day".to_string()), String::new())
        }
        (None, None) => return None,
    };

    Some(InboundItem {
        id: event.id,
        subject: event.summary.unwrap_or_default(),
        body: event.description.unwrap_or_default(),
        sender: event.organizer.map(|o| o.email).unwrap_or_default(),
        received_at,
        due,
        time,
        priority: None,
        source_kind: SourceKind::CalendarEvent,
    })
}

#[async_trait]
impl ItemSource for CalendarSource {
    fn name(&self) -> &'static str {
        "calendar"
    }

    async fn fetch(&self, since: NaiveDate) -> Result<Vec<InboundItem>, PlanningError> {
        let token = auth::ensure_fresh_token().await?;
        let client = reqwest::Client::new();

        let time_min = format!("{}T00:00:00Z", since);
        let time_max = format!(
            "{}T00:00:00Z",
            since + Duration::days(i64::from(self.horizon_days))
        );

        let resp = client
            .get(CALENDAR_EVENTS_URL)
            .bearer_auth(&token.token)
            .query(&[
                ("timeMin", time_min.as_str()),
                ("timeMax", time_max.as_str()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
                ("maxResults", "100"),
            ])
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(PlanningError::CredentialExpired);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PlanningError::SourceUnavailable {
                name: "calendar",
                reason: format!("events list failed ({}): {}", status, body),
            });
        }

        let list: EventListResponse = resp.json().await?;
        let items: Vec<InboundItem> = list
            .items
            .into_iter()
            .filter(|e| e.status.as_deref() != Some("cancelled"))
            .filter(|e| !is_skippable_reminder(e))
            .filter_map(map_event)
            .collect();
        log::info!(
            "calendar: fetched {} events over the next {} days",
            items.len(),
            self.horizon_days
        );
        Ok(items)
    }
}

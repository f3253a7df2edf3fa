//! Gmail API v1 source.
//!
//! Lists recent inbox messages (with obvious robot senders excluded in
//! the query itself), then fetches each message in full format: headers
//! for From/Subject/Date plus a MIME walk for the body, preferring
//! text/plain and falling back to text/html stripped to text.
//! Individual message fetch failures are skipped; the list call failing
//! makes the whole source unavailable.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use chrono::NaiveDate;
use serde::Deserialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::ItemSource;
use crate::auth;
use crate::error::PlanningError;
use crate::types::{InboundItem, SourceKind};

const GMAIL_BASE: &str = "https://gmail.googleapis.com/gmail/v1/users/me";
const MAX_RESULTS: u32 = 50;

// ============================================================================
// API response types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageListResponse {
    #[serde(default)]
    messages: Vec<MessageStub>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageStub {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageDetail {
    #[serde(default)]
    id: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    payload: Option<MessagePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessagePayload {
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    headers: Vec<Header>,
    #[serde(default)]
    body: Option<PayloadBody>,
    #[serde(default)]
    parts: Vec<MessagePayload>,
}

#[derive(Debug, Deserialize)]
struct Header {
    #[serde(default)]
    name: String,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayloadBody {
    #[serde(default)]
    data: Option<String>,
}

// ============================================================================
// Source
// ============================================================================

/// Gmail inbox as an item source.
pub struct GmailSource {
    lookback_days: u32,
    concurrency: usize,
}

impl GmailSource {
    pub fn new(lookback_days: u32, concurrency: usize) -> Self {
        Self {
            lookback_days,
            concurrency: concurrency.max(1),
        }
    }

    fn query(&self) -> String {
        format!(
            "newer_than:{}d -from:noreply -from:no-reply -from:donotreply",
            self.lookback_days.max(1)
        )
    }
}

#[async_trait]
impl ItemSource for GmailSource {
    fn name(&self) -> &'static str {
        "gmail"
    }

    async fn fetch(&self, _since: NaiveDate) -> Result<Vec<InboundItem>, PlanningError> {
        let token = auth::ensure_fresh_token().await?;
        let client = reqwest::Client::new();

        let resp = client
            .get(format!("{}/messages", GMAIL_BASE))
            .bearer_auth(&token.token)
            .query(&[
                ("q", self.query().as_str()),
                ("maxResults", &MAX_RESULTS.to_string()),
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
                name: "gmail",
                reason: format!("list failed ({}): {}", status, body),
            });
        }

        let list: MessageListResponse = resp.json().await?;
        if list.messages.is_empty() {
            log::info!("gmail: no messages in the last {} days", self.lookback_days);
            return Ok(Vec::new());
        }

        // Bounded fan-out over per-message full fetches.
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let access_token = Arc::new(token.token.clone());
        let mut set: JoinSet<Option<InboundItem>> = JoinSet::new();

        for stub in list.messages {
            let permit_pool = Arc::clone(&semaphore);
            let client = client.clone();
            let access_token = Arc::clone(&access_token);
            set.spawn(async move {
                let _permit = permit_pool.acquire_owned().await.ok()?;
                match fetch_message(&client, &access_token, &stub.id).await {
                    Ok(item) => Some(item),
                    Err(e) => {
                        log::debug!("gmail: skipping message {}: {}", stub.id, e);
                        None
                    }
                }
            });
        }

        let mut items = Vec::new();
        while let Some(joined) = set.join_next().await {
            if let Ok(Some(item)) = joined {
                items.push(item);
            }
        }

        // Newest first, matching inbox order, so downstream ties resolve
        // toward recency.
        items.sort_by(|a, b| b.received_time().cmp(&a.received_time()));
        log::info!("gmail: fetched {} messages", items.len());
        Ok(items)
    }
}

/// Fetch one message in full format and flatten it into an item.
async fn fetch_message(
    client: &reqwest::Client,
    access_token: &str,
    message_id: &str,
) -> Result<InboundItem, PlanningError> {
    let resp = client
        .get(format!("{}/messages/{}", GMAIL_BASE, message_id))
        .bearer_auth(access_token)
        .query(&[("format", "full")])
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(PlanningError::ApiError {
            status: status.as_u16(),
            message: body,
        });
    }

    let detail: MessageDetail = resp.json().await?;
    let payload = detail.payload.as_ref();

    let headers = payload.map(|p| &p.headers[..]).unwrap_or(&[]);
    let get_header = |name: &str| -> String {
        headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.clone())
            .unwrap_or_default()
    };

    let body = payload
        .and_then(extract_body)
        .unwrap_or_else(|| detail.snippet.clone());

    Ok(InboundItem {
        id: detail.id,
        subject: get_header("Subject"),
        body,
        sender: get_header("From"),
        received_at: get_header("Date"),
        due: None,
        time: None,
        priority: None,
        source_kind: SourceKind::Email,
    })
}

/// Walk MIME parts for text/plain, then text/html converted to text.
fn extract_body(payload: &MessagePayload) -> Option<String> {
    if let Some(text) = extract_body_text(payload, "text/plain") {
        return Some(text);
    }
    extract_body_text(payload, "text/html")
        .map(|html| html2text::from_read(html.as_bytes(), 80).unwrap_or(html))
}

fn extract_body_text(payload: &MessagePayload, target_mime: &str) -> Option<String> {
    if payload.mime_type == target_mime {
        if let Some(body) = &payload.body {
            if let Some(data) = &body.data {
                return decode_url_safe_base64(data);
            }
        }
    }
    for part in &payload.parts {
        if let Some(text) = extract_body_text(part, target_mime) {
            return Some(text);
        }
    }
    None
}

/// Decode URL-safe base64 (no padding) as used by the Gmail API.
fn decode_url_safe_base64(data: &str) -> Option<String> {
    base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(data)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
}

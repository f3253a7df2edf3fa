//! Item sources: anything that can contribute inbound items to a run.
//!
//! Sources are consumed through the `ItemSource` trait so the pipeline
//! can fan them out concurrently and so tests can substitute canned
//! fixtures for real API clients.

pub mod calendar;
pub mod gmail;
pub mod todoist;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::PlanningError;
use crate::types::InboundItem;

pub use calendar::CalendarSource;
pub use gmail::GmailSource;
pub use todoist::TodoistSource;

/// A producer of inbound items.
///
/// `since` bounds the lookback (emails) or marks the start of the
/// horizon (calendar); sources that have no time dimension may ignore
/// it. A fetch failure means the source contributes nothing this run;
/// only `CredentialExpired` should abort the whole run.
#[async_trait]
pub trait ItemSource: Send + Sync {
    /// Short name used in logs and error reports.
    fn name(&self) -> &'static str;

    async fn fetch(&self, since: NaiveDate) -> Result<Vec<InboundItem>, PlanningError>;
}

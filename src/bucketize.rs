//! Plan assembly: placing normalized items into immediacy tiers.
//!
//! Tier rules:
//! - do_now: anything due exactly today, plus urgent email threads
//! - do_soon: any other dated task or event
//! - monitor: low-priority email and tasks with no due date
//!
//! Buckets are display surfaces, so they carry caps: at most 8 email
//! items in do_now and at most 7 items in do_soon. Stats are counted
//! before any cap is applied, so the numbers reflect what the run found
//! rather than what fit on screen.

use chrono::NaiveDate;

use crate::types::{PlanItem, PlanStats, Priority, SourceKind};

pub const DO_NOW_EMAIL_CAP: usize = 8;
pub const DO_SOON_CAP: usize = 7;

/// The three immediacy tiers plus the counts taken before truncation.
#[derive(Debug, Default)]
pub struct Buckets {
    pub do_now: Vec<PlanItem>,
    pub do_soon: Vec<PlanItem>,
    pub monitor: Vec<PlanItem>,
    pub stats: PlanStats,
}

/// Assigns plan items to tiers and applies display caps.
#[derive(Debug, Clone)]
pub struct PlanBucketizer {
    do_now_email_cap: usize,
    do_soon_cap: usize,
}

impl Default for PlanBucketizer {
    fn default() -> Self {
        Self {
            do_now_email_cap: DO_NOW_EMAIL_CAP,
            do_soon_cap: DO_SOON_CAP,
        }
    }
}

enum Tier {
    DoNow,
    DoSoon,
    Monitor,
}

impl PlanBucketizer {
    pub fn new(do_now_email_cap: usize, do_soon_cap: usize) -> Self {
        Self {
            do_now_email_cap,
            do_soon_cap,
        }
    }

    fn tier(item: &PlanItem, today: NaiveDate) -> Tier {
        match item.source_kind {
            SourceKind::Email => {
                // Email reaching this point already passed the urgency
                // gate; only an explicitly low summarizer priority demotes.
                if item.priority == Priority::Low {
                    Tier::Monitor
                } else {
                    Tier::DoNow
                }
            }
            SourceKind::Task | SourceKind::CalendarEvent => match item.due {
                // Only an exact match is "today"; an overdue task is
                // rescheduling work, not a same-day commitment.
                Some(due) if due == today => Tier::DoNow,
                Some(_) => Tier::DoSoon,
                None => Tier::Monitor,
            },
        }
    }

    /// Place items into tiers. `items` must arrive in insertion order:
    /// emails first (descending thread score), then tasks, then events —
    /// caps keep the front of each bucket.
    pub fn bucketize(&self, items: Vec<PlanItem>, today: NaiveDate) -> Buckets {
        let mut buckets = Buckets::default();
        for item in items {
            match Self::tier(&item, today) {
                Tier::DoNow => buckets.do_now.push(item),
                Tier::DoSoon => buckets.do_soon.push(item),
                Tier::Monitor => buckets.monitor.push(item),
            }
        }

        buckets.stats = PlanStats {
            total_items: buckets.do_now.len() + buckets.do_soon.len() + buckets.monitor.len(),
            do_now: buckets.do_now.len(),
            do_soon: buckets.do_soon.len(),
            monitor: buckets.monitor.len(),
            ..PlanStats::default()
        };

        self.truncate(&mut buckets);
        buckets
    }

    fn truncate(&self, buckets: &mut Buckets) {
        let mut emails_kept = 0;
        buckets.do_now.retain(|item| {
            if item.source_kind != SourceKind::Email {
                return true;
            }
            emails_kept += 1;
            emails_kept <= self.do_now_email_cap
        });
        if buckets.do_soon.len() > self.do_soon_cap {
            log::debug!(
                "do_soon truncated from {} to {}",
                buckets.do_soon.len(),
                self.do_soon_cap
            );
            buckets.do_soon.truncate(self.do_soon_cap);
        }
    }
}

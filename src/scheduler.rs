//! Cron-driven planning loop.
//!
//! Polls every minute, fires a planning run when the configured schedule
//! is due (within a 2-minute window), and handles laptop sleep/wake:
//! a large jump between polls triggers a missed-job check with a 2-hour
//! grace period. Overlap protection lives in the planner's run lock, so
//! a slow run simply makes the next tick report `AlreadyRunning`.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;

use crate::config::ScheduleEntry;
use crate::error::PlanningError;
use crate::pipeline::Planner;

/// Grace period for jobs missed during sleep (2 hours).
const MISSED_JOB_GRACE_PERIOD_SECS: i64 = 7200;

/// Time jump threshold to detect sleep/wake (5 minutes).
const TIME_JUMP_THRESHOLD_SECS: i64 = 300;

/// Poll interval for the scheduler loop (1 minute).
const POLL_INTERVAL_SECS: u64 = 60;

/// Why a run was fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunTrigger {
    Scheduled,
    Missed,
}

/// Counters reported after each run.
#[derive(Debug, Default, Clone)]
pub struct RunStats {
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
    pub last_error: Option<String>,
}

/// Fires planning runs on a cron schedule.
pub struct PlanScheduler {
    planner: Arc<Planner>,
    entry: ScheduleEntry,
    stats: RunStats,
    last_run: Option<DateTime<Utc>>,
}

impl PlanScheduler {
    pub fn new(planner: Arc<Planner>, entry: ScheduleEntry) -> Self {
        Self {
            planner,
            entry,
            stats: RunStats::default(),
            last_run: None,
        }
    }

    /// Run the scheduler loop indefinitely.
    pub async fn run(&mut self) -> Result<(), PlanningError> {
        if !self.entry.enabled {
            log::warn!("schedule disabled; scheduler exiting");
            return Ok(());
        }
        // Validate the schedule up front so a config typo fails at start
        // rather than silently never firing.
        parse_cron(&self.entry.cron)?;
        parse_timezone(&self.entry.timezone)?;
        log::info!(
            "scheduler started: '{}' ({})",
            self.entry.cron,
            self.entry.timezone
        );

        let mut last_check = Utc::now();
        loop {
            tokio::time::sleep(Duration::from_secs(POLL_INTERVAL_SECS)).await;
            let now = Utc::now();

            let time_jump = (now - last_check).num_seconds();
            if time_jump > TIME_JUMP_THRESHOLD_SECS {
                log::info!(
                    "detected system wake (time jumped {} seconds), checking for missed jobs",
                    time_jump
                );
                if let Ok(Some(missed)) = self.find_missed_job(now) {
                    log::info!("found missed run scheduled for {}, running now", missed);
                    self.fire(now, RunTrigger::Missed).await;
                }
            }

            match self.should_run_now(now) {
                Ok(true) => self.fire(now, RunTrigger::Scheduled).await,
                Ok(false) => {}
                Err(e) => log::error!("schedule evaluation failed: {}", e),
            }

            last_check = now;
        }
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    async fn fire(&mut self, now: DateTime<Utc>, trigger: RunTrigger) {
        self.last_run = Some(now);
        self.stats.total += 1;
        log::info!("firing planning run ({:?})", trigger);
        match self.planner.run().await {
            Ok(plan) => {
                self.stats.successful += 1;
                log::info!(
                    "run complete: {} items ({} do_now)",
                    plan.stats.total_items,
                    plan.stats.do_now
                );
            }
            Err(e) => {
                self.stats.failed += 1;
                self.stats.last_error = Some(e.to_string());
                if e.requires_user_action() {
                    log::error!("run failed, user action required: {}", e);
                } else {
                    log::warn!("run failed: {}", e);
                }
            }
        }
        log::info!(
            "run stats: {} total, {} ok, {} failed",
            self.stats.total,
            self.stats.successful,
            self.stats.failed
        );
    }

    /// Whether the schedule is due at `now` (within a 2-minute window,
    /// deduplicated against the last fired run).
    fn should_run_now(&self, now: DateTime<Utc>) -> Result<bool, PlanningError> {
        let schedule = parse_cron(&self.entry.cron)?;
        let tz = parse_timezone(&self.entry.timezone)?;
        let now_local = now.with_timezone(&tz);

        let mut upcoming = schedule.after(&(now_local - chrono::Duration::minutes(2)));
        if let Some(next_time) = upcoming.next() {
            let next_utc = next_time.with_timezone(&Utc);
            let diff = (now - next_utc).num_seconds().abs();
            if diff < 120 {
                if let Some(last) = self.last_run {
                    if (last - next_utc).num_seconds().abs() < 60 {
                        return Ok(false);
                    }
                }
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Find a scheduled time missed within the grace period.
    fn find_missed_job(&self, now: DateTime<Utc>) -> Result<Option<DateTime<Utc>>, PlanningError> {
        let schedule = parse_cron(&self.entry.cron)?;
        let tz = parse_timezone(&self.entry.timezone)?;
        let grace_start =
            now.with_timezone(&tz) - chrono::Duration::seconds(MISSED_JOB_GRACE_PERIOD_SECS);

        for scheduled in schedule.after(&grace_start) {
            let scheduled_utc = scheduled.with_timezone(&Utc);
            if scheduled_utc > now {
                break;
            }
            if let Some(last) = self.last_run {
                if last >= scheduled_utc {
                    continue;
                }
            }
            return Ok(Some(scheduled_utc));
        }
        Ok(None)
    }
}

/// Parse a 5-field cron expression (the `cron` crate wants 6 fields with
/// seconds, so a leading "0" is prepended).
pub fn parse_cron(expr: &str) -> Result<Schedule, PlanningError> {
    let full_expr = format!("0 {}", expr);
    full_expr.parse::<Schedule>().map_err(|e| {
        PlanningError::ConfigurationError(format!("Invalid cron expression '{}': {}", expr, e))
    })
}

fn parse_timezone(name: &str) -> Result<Tz, PlanningError> {
    name.parse()
        .map_err(|_| PlanningError::ConfigurationError(format!("Invalid timezone: {}", name)))
}

/// The next time the entry will fire, in UTC.
pub fn next_run_time(entry: &ScheduleEntry) -> Result<DateTime<Utc>, PlanningError> {
    let schedule = parse_cron(&entry.cron)?;
    let tz = parse_timezone(&entry.timezone)?;
    let next = schedule.upcoming(tz).next().ok_or_else(|| {
        PlanningError::ConfigurationError("No upcoming scheduled time".to_string())
    })?;
    Ok(next.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cron_default_schedule() {
        assert!(parse_cron("0 6,9,12,15,18 * * *").is_ok());
    }

    #[test]
    fn test_parse_cron_invalid() {
        assert!(parse_cron("not a cron").is_err());
        let err = parse_cron("61 25 * * *").unwrap_err();
        assert!(err.requires_user_action());
    }

    #[test]
    fn test_next_run_time() {
        let entry = ScheduleEntry::default();
        assert!(next_run_time(&entry).is_ok());
    }

    #[test]
    fn test_invalid_timezone_rejected() {
        let entry = ScheduleEntry {
            enabled: true,
            cron: "0 8 * * *".to_string(),
            timezone: "Mars/Olympus_Mons".to_string(),
        };
        assert!(next_run_time(&entry).is_err());
    }
}

//! Watch mode: run a status check at every tick of a cron schedule.

use std::str::FromStr;

use anyhow::Result;
use chrono::{DateTime, Local};
use cron::Schedule as CronSchedule;
use tracing::{error, info, warn};

use crate::checker::RunOutcome;
use crate::config::Config;

/// Parse a six- or seven-field cron expression (seconds first).
pub fn parse_schedule(cron_expr: &str) -> Result<CronSchedule> {
    CronSchedule::from_str(cron_expr)
        .map_err(|e| anyhow::anyhow!("Invalid cron expression '{}': {}", cron_expr, e))
}

/// The next `count` tick times after `after`.
pub fn next_runs_after(
    cron_expr: &str,
    after: DateTime<Local>,
    count: usize,
) -> Result<Vec<DateTime<Local>>> {
    let schedule = parse_schedule(cron_expr)?;
    Ok(schedule.after(&after).take(count).collect())
}

/// The next `count` tick times from now.
pub fn next_runs(cron_expr: &str, count: usize) -> Result<Vec<DateTime<Local>>> {
    next_runs_after(cron_expr, Local::now(), count)
}

/// Main scheduler loop. Runs until Ctrl-C or the schedule is exhausted.
pub async fn watch(config: Config) -> Result<()> {
    let schedule = parse_schedule(&config.schedule.cron)?;
    info!(cron = %config.schedule.cron, "Scheduler engine started");

    loop {
        let Some(next) = schedule.upcoming(Local).next() else {
            warn!(cron = %config.schedule.cron, "Schedule has no upcoming runs");
            return Ok(());
        };
        let wait = (next - Local::now()).to_std().unwrap_or_default();
        info!(next = %next.to_rfc3339(), "Next run scheduled");

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping scheduler");
                return Ok(());
            }
        }

        match crate::run_once(&config).await {
            RunOutcome::Completed(record) => {
                let failed = record.routes.iter().filter(|r| r.error.is_some()).count();
                info!(
                    timestamp = %record.timestamp,
                    routes = record.routes.len(),
                    with_errors = failed,
                    seconds = record.execution_time_seconds,
                    "Scheduled run finished"
                );
            }
            RunOutcome::Failed(failure) => {
                error!(message = %failure.message, "Scheduled run failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_rejects_bad_expression() {
        let err = parse_schedule("every five minutes").unwrap_err();
        assert!(err.to_string().contains("Invalid cron expression"));
    }

    #[test]
    fn test_next_runs_every_quarter_hour() {
        let after = Local.with_ymd_and_hms(2025, 6, 1, 10, 7, 0).unwrap();
        let runs = next_runs_after("0 */15 * * * *", after, 3).unwrap();
        let minutes: Vec<_> = runs.iter().map(|t| (t.hour(), t.minute())).collect();
        assert_eq!(minutes, vec![(10, 15), (10, 30), (10, 45)]);
    }

    #[test]
    fn test_next_runs_from_now_are_ordered() {
        let runs = next_runs("0 0 * * * *", 4).unwrap();
        assert_eq!(runs.len(), 4);
        assert!(runs.windows(2).all(|w| w[0] < w[1]));
    }
}

//! Timer-driven execution of check runs.
//!
//! Schedules are `cron` expressions read from `CRON_FREQUENCY`. The `cron`
//! crate wants a leading seconds field; classic five-field expressions get
//! `0` seconds prepended. Weekday numbers follow classic cron (0 or 7 is
//! Sunday, 1 is Monday) and are renumbered for the `cron` crate, which counts
//! 1 as Sunday.

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use cron::Schedule;
use log::{error, info, warn};

use crate::config::{Config, ENV_CRON_FREQUENCY};
use crate::error_handling::{InitializationError, RunError};
use crate::run::{run_check, RunReport};
use crate::tls::CertificateFetcher;

/// Position of the day-of-week field once the seconds field is present.
const DAY_OF_WEEK_FIELD: usize = 5;

/// Parses a schedule expression (5, 6 or 7 fields).
///
/// # Errors
///
/// Returns `InitializationError::ScheduleError` if the expression does not parse.
pub fn parse_schedule(expression: &str) -> Result<Schedule, InitializationError> {
    let invalid = |message: String| InitializationError::ScheduleError {
        expression: expression.to_string(),
        message,
    };

    let normalized = normalize_expression(expression).map_err(invalid)?;
    Schedule::from_str(&normalized).map_err(|e| invalid(e.to_string()))
}

fn normalize_expression(expression: &str) -> Result<String, String> {
    let mut fields: Vec<String> = expression.split_whitespace().map(str::to_string).collect();
    if fields.len() == 5 {
        fields.insert(0, "0".to_string());
    }
    if let Some(day_of_week) = fields.get_mut(DAY_OF_WEEK_FIELD) {
        *day_of_week = translate_day_of_week(day_of_week)?;
    }
    Ok(fields.join(" "))
}

/// Rewrites numeric weekdays into the `cron` crate's numbering.
///
/// Numeric ranges and steps are expanded into explicit lists, so `5-7`
/// (Friday to Sunday) does not wrap. Names, `*` and `?` pass through.
fn translate_day_of_week(field: &str) -> Result<String, String> {
    let items = field
        .split(',')
        .map(translate_day_of_week_item)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(items.join(","))
}

fn translate_day_of_week_item(item: &str) -> Result<String, String> {
    let (range, step) = match item.split_once('/') {
        Some((range, step)) => {
            let step = step
                .parse::<usize>()
                .ok()
                .filter(|step| *step > 0)
                .ok_or_else(|| format!("invalid day-of-week step '{step}'"))?;
            (range, Some(step))
        }
        None => (item, None),
    };

    let (start, end) = match range.split_once('-') {
        Some((start, end)) => match (weekday_number(start)?, weekday_number(end)?) {
            (Some(start), Some(end)) => (start, end),
            _ => return Ok(item.to_string()),
        },
        None => match weekday_number(range)? {
            Some(day) if step.is_some() => (day, 6),
            Some(day) => return Ok(cron_crate_weekday(day).to_string()),
            None => return Ok(item.to_string()),
        },
    };
    if start > end {
        return Err(format!("day-of-week range '{range}' runs backwards"));
    }

    let mut days: Vec<u8> = (start..=end)
        .step_by(step.unwrap_or(1))
        .map(cron_crate_weekday)
        .collect();
    days.sort_unstable();
    days.dedup();
    Ok(days
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(","))
}

/// Numeric weekday token, `None` for names and wildcards.
fn weekday_number(token: &str) -> Result<Option<u8>, String> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(None);
    }
    match token.parse::<u8>() {
        Ok(day) if day <= 7 => Ok(Some(day)),
        _ => Err(format!("day-of-week {token} is out of range 0-7")),
    }
}

/// 0 and 7 (Sunday) become 1, Monday..Saturday become 2..7.
fn cron_crate_weekday(day: u8) -> u8 {
    day % 7 + 1
}

/// Reads and parses `CRON_FREQUENCY` through `lookup`.
pub fn schedule_from_lookup<F>(lookup: F) -> Result<Schedule, InitializationError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(ENV_CRON_FREQUENCY).filter(|value| !value.trim().is_empty()) {
        Some(expression) => parse_schedule(&expression),
        None => Err(InitializationError::ScheduleError {
            expression: String::new(),
            message: format!("{ENV_CRON_FREQUENCY} is not set"),
        }),
    }
}

/// Reads and parses `CRON_FREQUENCY` from the process environment.
pub fn schedule_from_env() -> Result<Schedule, InitializationError> {
    schedule_from_lookup(|key| std::env::var(key).ok())
}

/// First fire time strictly after `now`.
pub fn next_fire_time(schedule: &Schedule, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    schedule.after(&now).next()
}

/// Runs a check at every fire time of `schedule` until Ctrl-C.
///
/// Nothing runs at startup; the first check happens at the first fire time.
/// Configuration is re-read before every run. A failing run is logged and
/// the loop waits for the next fire time.
pub async fn run_scheduled<F>(schedule: &Schedule, fetcher: &F)
where
    F: CertificateFetcher,
{
    loop {
        let now = Utc::now();
        let Some(next) = next_fire_time(schedule, now) else {
            warn!("Schedule has no upcoming fire time, stopping");
            return;
        };
        info!("Next check at {next}");

        let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl-C, stopping scheduler");
                return;
            }
        }

        run_triggered(fetcher).await;
    }
}

/// Reads the configuration through `lookup` and runs one check with it.
///
/// # Errors
///
/// Returns `RunError::Configuration` if the settings no longer validate, or
/// any error of `run_check`.
pub async fn run_with_config_from<L, F>(lookup: L, fetcher: &F) -> Result<RunReport, RunError>
where
    L: Fn(&str) -> Option<String>,
    F: CertificateFetcher,
{
    let config = Config::from_lookup(lookup)?;
    run_check(&config, fetcher).await
}

async fn run_triggered<F>(fetcher: &F)
where
    F: CertificateFetcher,
{
    info!("Scheduled check triggered at {}", Utc::now());
    match run_with_config_from(|key| std::env::var(key).ok(), fetcher).await {
        Ok(report) => info!(
            "Check finished: {} expiring certificate(s), notification sent: {}",
            report.expiring.len(),
            report.notified
        ),
        Err(RunError::Configuration(e)) => error!("Check skipped, configuration is invalid: {e}"),
        Err(e) => error!("Check failed: {e}"),
    }
}

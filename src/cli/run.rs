// src/cli/run.rs — One-shot recommendation run

use chrono::Utc;
use uuid::Uuid;

use crate::infra::config::Config;
use crate::infra::daemon::{describe_outcome, WeeklySchedule};
use crate::recommend::formatter::mode_name;
use crate::recommend::job::{JobSettings, RecommendationJob, RunOutcome};
use crate::store::StoreHandle;

/// Pick the batch key: explicit > fresh (`--force`) > current weekly slot.
pub fn resolve_run_key(
    config: &Config,
    explicit: Option<String>,
    force: bool,
) -> anyhow::Result<String> {
    if let Some(key) = explicit {
        return Ok(key);
    }
    if force {
        return Ok(format!("manual-{}", Uuid::new_v4()));
    }
    let schedule = WeeklySchedule::from_config(config)?;
    Ok(schedule.run_key(&Utc::now()))
}

/// Run the job once and print the result.
pub async fn run_once(
    config: &Config,
    store: &StoreHandle,
    run_key: Option<String>,
    force: bool,
    verbose: bool,
) -> anyhow::Result<RunOutcome> {
    let settings = JobSettings::from_config(config)?;
    let run_key = resolve_run_key(config, run_key, force)?;

    let job = RecommendationJob::new(store, store, settings);
    let outcome = job.run(&run_key).await?;

    if let Some(report) = outcome.report() {
        for rec in &report.recommendations {
            println!("{rec}");
            println!();
        }
        if report.skipped > 0 {
            println!("Skipped {} malformed history record(s).", report.skipped);
        }
        if verbose {
            println!("Care averages by mode:");
            for (code, avg) in &report.care_stats {
                println!(
                    "  {:<12} crumbs {:.2}  grease {:.2}  water {:.2}  ({} sessions)",
                    mode_name(*code),
                    avg.crumb_care,
                    avg.grease_care,
                    avg.water_care,
                    avg.sessions
                );
            }
        }
    }
    println!("Run {}: {}", run_key, describe_outcome(&outcome));

    Ok(outcome)
}

// src/infra/daemon/mod.rs

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::infra::errors::RecommendError;
use crate::recommend::job::{JobSettings, RecommendationJob, RunOutcome};
use crate::store::StoreHandle;

pub mod process;
pub mod scheduler;

pub use process::{is_daemon_running, read_pid, remove_pid_file, signal_stop, write_pid_file};
pub use scheduler::{SlotTracker, WeeklySchedule};

/// Everything the daemon needs to run scheduled jobs.
pub struct DaemonContext {
    pub store: StoreHandle,
    pub settings: JobSettings,
    pub schedule: WeeklySchedule,
    pub check_interval: Duration,
    pub max_attempts: u32,
}

/// Run the daemon loop: evaluate the weekly slot on every tick until Ctrl+C.
pub async fn run_daemon(ctx: DaemonContext) -> anyhow::Result<()> {
    tracing::info!(
        "cleanrec daemon starting for {} (next slot {})",
        ctx.settings.device,
        ctx.schedule.next_slot(&Utc::now())
    );

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut interval = tokio::time::interval(ctx.check_interval);
    let mut tracker = SlotTracker::new();

    println!("Daemon running. Press Ctrl+C to stop.");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                run_due_slot(&ctx, &mut tracker, Utc::now()).await;
            }
            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received");
                println!("\nShutting down daemon...");
                break;
            }
        }
    }

    tracing::info!("Daemon stopped.");
    Ok(())
}

/// Run the job for the slot covering `now` if it still needs a run.
///
/// Returns `None` when nothing was attempted. The slot from before the
/// daemon started is caught up on the first tick; the run key makes that
/// safe when the batch was already written.
pub async fn run_due_slot(
    ctx: &DaemonContext,
    tracker: &mut SlotTracker,
    now: DateTime<Utc>,
) -> Option<Result<RunOutcome, RecommendError>> {
    let run_key = ctx.schedule.run_key(&now);
    if !tracker.should_attempt(&run_key, ctx.max_attempts) {
        return None;
    }

    tracing::info!("Running recommendation job for slot {}", run_key);
    let job = RecommendationJob::new(&ctx.store, &ctx.store, ctx.settings.clone());
    let result = job.run(&run_key).await;

    match &result {
        Ok(outcome) => {
            tracker.record_attempt(true);
            tracing::info!("Slot {} finished: {}", run_key, describe_outcome(outcome));
        }
        Err(e) if e.is_retriable() => {
            tracker.record_attempt(false);
            tracing::error!(
                "Slot {} failed (attempt {}/{}): {}",
                run_key,
                tracker.attempts(),
                ctx.max_attempts,
                e
            );
        }
        Err(e) => {
            tracker.record_attempt(true);
            tracing::error!("Slot {} failed, not retrying: {}", run_key, e);
        }
    }

    Some(result)
}

/// One-line summary of a run outcome for logs and the CLI.
pub fn describe_outcome(outcome: &RunOutcome) -> String {
    match outcome {
        RunOutcome::Written(r) => format!(
            "stored {} recommendation(s) from {} session(s)",
            r.recommendations.len(),
            r.total_events
        ),
        RunOutcome::AlreadyWritten(r) => {
            format!("batch '{}' was already stored, nothing written", r.run_key)
        }
        RunOutcome::NoHistory => "no cleaning history, nothing written".to_string(),
        RunOutcome::NoGroups { skipped } => {
            format!("no usable sessions ({skipped} record(s) skipped), nothing written")
        }
    }
}

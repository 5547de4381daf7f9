// src/cli/daemon.rs — Daemon start/stop/status commands

use std::time::Duration;

use crate::cli::DaemonAction;
use crate::infra::config::Config;
use crate::infra::daemon::{self, DaemonContext, WeeklySchedule};
use crate::recommend::job::JobSettings;
use crate::store::StoreHandle;

pub async fn run_daemon_command(
    action: DaemonAction,
    config: &Config,
    store: StoreHandle,
) -> anyhow::Result<()> {
    match action {
        DaemonAction::Start => {
            let ctx = DaemonContext {
                store,
                settings: JobSettings::from_config(config)?,
                schedule: WeeklySchedule::from_config(config)?,
                check_interval: Duration::from_secs(config.schedule.check_interval_secs),
                max_attempts: config.schedule.max_attempts,
            };

            let pid_path = daemon::write_pid_file()?;
            println!("Daemon PID file: {}", pid_path.display());

            let result = daemon::run_daemon(ctx).await;

            daemon::remove_pid_file();
            result
        }
        DaemonAction::Stop => {
            let Some(pid) = daemon::read_pid() else {
                println!("No daemon PID file found. Daemon is not running.");
                return Ok(());
            };

            if !daemon::is_daemon_running() {
                println!("Daemon (PID {pid}) is not running. Cleaning up stale PID file.");
                daemon::remove_pid_file();
                return Ok(());
            }

            daemon::signal_stop(pid)?;
            println!("Sent stop signal to daemon (PID {pid}).");
            Ok(())
        }
        DaemonAction::Status => {
            match daemon::read_pid() {
                Some(pid) if daemon::is_daemon_running() => {
                    println!("Daemon is running (PID {pid}).")
                }
                _ => println!("Daemon is not running."),
            }
            Ok(())
        }
    }
}

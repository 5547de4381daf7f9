// src/cli/status.rs — System status display

use chrono::Utc;

use crate::infra::config::Config;
use crate::infra::daemon::{self, WeeklySchedule};
use crate::infra::paths;
use crate::store::{schema, Store};

/// Display configuration, storage and daemon status.
pub fn show_status(config: &Config, store: &Store) -> anyhow::Result<()> {
    let device = config.device();
    let config_path = paths::config_file_path();

    println!("cleanrec v{}", env!("CARGO_PKG_VERSION"));
    println!();

    if config_path.exists() {
        println!("  Config:     {} (loaded)", config_path.display());
    } else {
        println!("  Config:     (using defaults)");
    }
    println!(
        "  Database:   {} (schema v{})",
        paths::db_path().display(),
        schema::schema_version(store.conn())?
    );
    println!("  Device:     {}", device);
    println!(
        "  Ranking:    top {} in {}",
        config.recommend.top_k, config.recommend.timezone
    );

    let schedule = WeeklySchedule::from_config(config)?;
    let now = Utc::now();
    println!(
        "  Schedule:   {} {:02}:{:02} (current slot {}, next {})",
        config.schedule.weekday,
        config.schedule.hour,
        config.schedule.minute,
        schedule.run_key(&now),
        schedule.next_slot(&now)
    );

    println!();
    println!("  History:    {} session(s)", store.count_history(&device)?);
    println!(
        "  Batches:    {} stored run(s)",
        store.count_prediction_runs(&device)?
    );

    match daemon::read_pid() {
        Some(pid) if daemon::is_daemon_running() => println!("  Daemon:     running (PID {pid})"),
        Some(pid) => println!("  Daemon:     not running (stale PID {pid})"),
        None => println!("  Daemon:     not running"),
    }

    Ok(())
}

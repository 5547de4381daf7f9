// src/main.rs — cleanrec entry point

use clap::Parser;

use cleanrec::cli::{Cli, Commands, HistoryAction};
use cleanrec::infra::config::Config;
use cleanrec::infra::{logger, paths};
use cleanrec::store;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config (falls back to defaults if no config.toml)
    let config = if let Some(ref path) = cli.config {
        Config::load_from(std::path::Path::new(path))?
    } else {
        Config::load()?
    };

    // Initialize logging (RUST_LOG overrides the configured level)
    logger::init_logging(&config.log.level);
    config.validate()?;

    let db = store::open(&paths::db_path())?;

    if let Commands::Status = cli.command {
        return cleanrec::cli::status::show_status(&config, &db);
    }

    let (handle, _server) = store::spawn_store_server(db);

    match cli.command {
        Commands::Run {
            run_key,
            force,
            verbose,
        } => {
            cleanrec::cli::run::run_once(&config, &handle, run_key, force, verbose).await?;
            Ok(())
        }
        Commands::History { action } => match action {
            HistoryAction::Import { file } => {
                cleanrec::cli::history::run_import(&config, &handle, &file).await
            }
            HistoryAction::Add {
                mode,
                start,
                crumb,
                grease,
                water,
            } => {
                cleanrec::cli::history::run_add(
                    &config, &handle, &mode, &start, crumb, grease, water,
                )
                .await
            }
        },
        Commands::Predictions { json } => {
            cleanrec::cli::predictions::show_predictions(&config, &handle, json).await
        }
        Commands::Daemon { action } => {
            cleanrec::cli::daemon::run_daemon_command(action, &config, handle).await
        }
        Commands::Status => unreachable!("status is served before the store server starts"),
    }
}

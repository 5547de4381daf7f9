// src/infra/paths.rs — XDG-compliant path management
//
// All paths respect the CLEANREC_HOME environment variable for isolation.
// When CLEANREC_HOME is set, config and data live under that directory.
// When unset, config uses ~/.cleanrec/ and data uses XDG_DATA_HOME/cleanrec.

use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

/// Returns the CLEANREC_HOME override, if set.
fn cleanrec_home() -> Option<PathBuf> {
    std::env::var_os("CLEANREC_HOME").map(PathBuf::from)
}

/// Configuration directory: $CLEANREC_HOME/ or ~/.cleanrec/
pub fn config_dir() -> PathBuf {
    if let Some(home) = cleanrec_home() {
        return home;
    }
    match BaseDirs::new() {
        Some(base) => base.home_dir().join(".cleanrec"),
        None => PathBuf::from(".cleanrec"),
    }
}

/// Data directory: $CLEANREC_HOME/data/ or ~/.local/share/cleanrec/
pub fn data_dir() -> PathBuf {
    if let Some(home) = cleanrec_home() {
        return home.join("data");
    }
    match ProjectDirs::from("", "", "cleanrec") {
        Some(dirs) => dirs.data_local_dir().to_path_buf(),
        None => config_dir().join("data"),
    }
}

/// Database path
pub fn db_path() -> PathBuf {
    data_dir().join("cleanrec.db")
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Daemon PID file
pub fn pid_file_path() -> PathBuf {
    data_dir().join("daemon.pid")
}

use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration, loaded from environment variables. Command-line
/// flags take precedence over these values.
pub struct Config {
    /// Directory holding the detector weight files.
    pub model_dir: PathBuf,
    /// Cadence of detection ticks.
    pub tick_interval: Duration,
    /// Seconds after which an incomplete replay session is abandoned.
    pub session_timeout_secs: u64,
}

impl Config {
    /// Load configuration from `PRESAGE_*` environment variables with
    /// defaults.
    pub fn from_env() -> Self {
        let model_dir = std::env::var("PRESAGE_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_model_dir());

        Self {
            model_dir,
            tick_interval: Duration::from_millis(env_u64("PRESAGE_TICK_INTERVAL_MS", 500)),
            session_timeout_secs: env_u64("PRESAGE_SESSION_TIMEOUT_SECS", 30),
        }
    }
}

/// `$XDG_DATA_HOME/presage/models`, falling back to `~/.local/share`.
fn default_model_dir() -> PathBuf {
    let data_home = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local/share")
        });
    data_home.join("presage/models")
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

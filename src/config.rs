use figment::{Figment, providers::Env};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::LazyLock;

/// Runtime configuration, populated from `VAXAPI_*` environment variables
/// (a `.env` file is honored via dotenvy in `main`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite connection string; the file is created if missing.
    pub database_url: String,
    /// Bind address for the HTTP server.
    pub listen_addr: String,
    /// Default log filter when RUST_LOG is unset.
    pub loglevel: String,
    /// Optional CSV file with vaccine catalog seed rows (`name,num_doses,obs`).
    pub seed_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:vaxapi.db".to_string(),
            listen_addr: "0.0.0.0:5050".to_string(),
            loglevel: "info".to_string(),
            seed_path: None,
        }
    }
}

pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Figment::new()
        .merge(Env::prefixed("VAXAPI_"))
        .extract()
        .expect("invalid VAXAPI_* configuration")
});

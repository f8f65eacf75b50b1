use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub public_url: String,
    pub send_delay: Duration,
    /// Directory with the built front-end, served for any non-API path.
    pub static_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.into());

        let port = get("LOCKER_PORT", "3000")
            .parse()
            .context("LOCKER_PORT must be a port number")?;
        let send_delay_ms: u64 = get("LOCKER_SEND_DELAY_MS", "1200")
            .parse()
            .context("LOCKER_SEND_DELAY_MS must be a whole number of milliseconds")?;

        Ok(Self {
            host: get("LOCKER_HOST", "0.0.0.0"),
            port,
            db_path: PathBuf::from(get("LOCKER_DB_PATH", "locker.db")),
            public_url: get("LOCKER_PUBLIC_URL", "http://localhost:3000")
                .trim_end_matches('/')
                .to_string(),
            send_delay: Duration::from_millis(send_delay_ms),
            static_dir: lookup("LOCKER_STATIC_DIR")
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from),
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

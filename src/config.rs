//! Runtime configuration, read from the environment (and `.env`).

use dotenvy::dotenv;
use std::env;

pub const DEFAULT_DATABASE_URL: &str = "lateshow.db";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5555;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Path of the sqlite database file.
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Log at debug level.
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            debug: false,
        }
    }
}

impl Config {
    /// Build a config from `DATABASE_URL`, `LATESHOW_HOST`, `LATESHOW_PORT`
    /// and `LATESHOW_DEBUG`, falling back to defaults for anything unset.
    pub fn from_env() -> eyre::Result<Config> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> eyre::Result<Config> {
        let defaults = Config::default();

        let port = match lookup("LATESHOW_PORT") {
            Some(port) => port
                .parse()
                .map_err(|err| eyre::eyre!("invalid LATESHOW_PORT {:?}: {}", port, err))?,
            None => defaults.port,
        };

        Ok(Config {
            database_url: lookup("DATABASE_URL")
                .map(|url| normalize_database_url(&url))
                .unwrap_or(defaults.database_url),
            host: lookup("LATESHOW_HOST").unwrap_or(defaults.host),
            port,
            debug: lookup("LATESHOW_DEBUG")
                .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.debug),
        })
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Accept SQLAlchemy style `sqlite:///relative.db` / `sqlite:////abs.db` urls
/// as well as bare paths.
pub fn normalize_database_url(url: &str) -> String {
    url.strip_prefix("sqlite:///")
        .or_else(|| url.strip_prefix("sqlite://"))
        .unwrap_or(url)
        .to_string()
}

//! Process settings from the environment (`.env` is loaded by the binary via dotenvy).

use std::path::PathBuf;

pub const DEFAULT_DATABASE_URL: &str = "sqlite::memory:";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Clone, Debug)]
pub struct Settings {
    /// `DATABASE_URL`, e.g. `sqlite://data.db` or `sqlite::memory:`.
    pub database_url: String,
    /// `SCHEMA_PATH`: compiled schema document (JSON).
    pub schema_path: Option<PathBuf>,
    /// `BIND_ADDR` for the HTTP listener.
    pub bind_addr: String,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| get(key).filter(|s| !s.trim().is_empty());
        Settings {
            database_url: non_empty("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
            schema_path: non_empty("SCHEMA_PATH").map(PathBuf::from),
            bind_addr: non_empty("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into()),
        }
    }
}

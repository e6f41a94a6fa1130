use anyhow::{bail, Result};
use serde_json::Value;

/// Env var read for the database URL when config does not name one.
pub const DEFAULT_DATABASE_URL_ENV: &str = "CSYNC_DATABASE_URL";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
/// Seconds to wait for the first Postgres connection before giving up.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Typed view of the keys a sync run reads.
///
/// ```yaml
/// feed:
///   path: "feeds/catalog.xml"
/// database:
///   url_env: "CSYNC_DATABASE_URL"   # env var NAME, never the URL
///   max_connections: 5
///   connect_timeout_secs: 30
/// sync:
///   dry_run: false
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    pub feed_path: Option<String>,
    pub database_url_env: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
    pub dry_run: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            feed_path: None,
            database_url_env: DEFAULT_DATABASE_URL_ENV.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            dry_run: false,
        }
    }
}

impl SyncSettings {
    /// Absent keys take their defaults; present keys of the wrong type fail
    /// with `CONFIG_INVALID` naming the pointer.
    pub fn from_config_json(config: &Value) -> Result<Self> {
        let mut s = Self::default();

        if let Some(path) = read_str(config, "/feed/path")? {
            s.feed_path = Some(path);
        }
        if let Some(name) = read_str(config, "/database/url_env")? {
            s.database_url_env = name;
        }
        if let Some(n) = read_positive(config, "/database/max_connections", u64::from(u32::MAX))? {
            s.max_connections = n as u32;
        }
        if let Some(n) = read_positive(config, "/database/connect_timeout_secs", u64::MAX)? {
            s.connect_timeout_secs = n;
        }
        if let Some(v) = config.pointer("/sync/dry_run") {
            s.dry_run = match v.as_bool() {
                Some(b) => b,
                None => bail!("CONFIG_INVALID /sync/dry_run: expected a boolean, got {v}"),
            };
        }

        Ok(s)
    }
}

/// Non-blank string at `pointer`. Absent or null -> `None`.
fn read_str(config: &Value, pointer: &str) -> Result<Option<String>> {
    match config.pointer(pointer) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(Some(s.trim().to_string())),
        Some(other) => bail!("CONFIG_INVALID {pointer}: expected a non-empty string, got {other}"),
    }
}

/// Integer in `1..=max` at `pointer`. Absent -> `None`.
fn read_positive(config: &Value, pointer: &str, max: u64) -> Result<Option<u64>> {
    match config.pointer(pointer) {
        None => Ok(None),
        Some(v) => match v.as_u64() {
            Some(n) if (1..=max).contains(&n) => Ok(Some(n)),
            _ => bail!("CONFIG_INVALID {pointer}: expected a positive integer, got {v}"),
        },
    }
}

//! Runtime secret resolution.
//!
//! # Contract
//! - Config YAML stores only the env var NAME of the database URL
//!   (`database.url_env`, default `CSYNC_DATABASE_URL`).
//! - Callers resolve it once at startup and pass the result to the
//!   connection layer; nothing else reads the variable.
//! - `Debug` on [`DatabaseUrl`] redacts the value.
//! - Error messages reference the env var NAME, never the value.

use anyhow::{bail, Result};

use crate::SyncSettings;

/// Database connection URL read from the environment.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseUrl {
    env_var: String,
    url: String,
}

impl DatabaseUrl {
    /// Name of the env var the URL came from.
    pub fn env_var(&self) -> &str {
        &self.env_var
    }

    /// The URL itself. Do not log it.
    pub fn expose(&self) -> &str {
        &self.url
    }
}

impl std::fmt::Debug for DatabaseUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseUrl")
            .field("env_var", &self.env_var)
            .field("url", &"<REDACTED>")
            .finish()
    }
}

/// Unset or blank -> `None`.
fn resolve_env(var_name: &str) -> Option<String> {
    match std::env::var(var_name) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => None,
    }
}

/// Resolve the database URL from the env var named by `settings`.
///
/// # Errors
/// `SECRETS_MISSING` naming the variable when it is unset or blank.
pub fn resolve_database_url(settings: &SyncSettings) -> Result<DatabaseUrl> {
    let name = settings.database_url_env.as_str();
    match resolve_env(name) {
        Some(url) => Ok(DatabaseUrl {
            env_var: name.to_string(),
            url,
        }),
        None => bail!(
            "SECRETS_MISSING: required env var '{}' (database url) is not set or empty",
            name
        ),
    }
}

//! Command handler modules for csync.
//!
//! Shared config and feed loading lives here; command-specific logic lives in
//! the submodules.

pub mod inspect;
pub mod sync;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csync_config::{report_unused_keys, ConfigMode, LoadedConfig, UnusedKeyPolicy};
use csync_feed::Catalog;

/// Load layered config; no paths means an empty config.
pub fn load_config(config_paths: &[String]) -> Result<LoadedConfig> {
    if config_paths.is_empty() {
        return LoadedConfig::empty();
    }
    let path_refs: Vec<&str> = config_paths.iter().map(|s| s.as_str()).collect();
    csync_config::load_layered_yaml(&path_refs)
}

/// Print unused config keys to stderr; with `Fail` policy, error instead.
pub fn check_unused_keys(
    mode: ConfigMode,
    loaded: &LoadedConfig,
    policy: UnusedKeyPolicy,
) -> Result<()> {
    let report = report_unused_keys(mode, &loaded.config_json, policy)?;
    if !report.is_clean() {
        eprintln!(
            "WARN: CONFIG_UNUSED_KEYS mode={} unused_leaf_keys={}",
            report.mode,
            report.unused_leaf_pointers.len()
        );
        for p in report.unused_leaf_pointers.iter().take(50) {
            eprintln!("  unused={}", p);
        }
        let extra = report.unused_leaf_pointers.len().saturating_sub(50);
        if extra > 0 {
            eprintln!("  ... and {} more", extra);
        }
    }
    Ok(())
}

/// `--feed` wins over `feed.path` from config; one of them is required.
pub fn resolve_feed_path(flag: Option<String>, from_config: Option<&str>) -> Result<PathBuf> {
    flag.or_else(|| from_config.map(str::to_string))
        .map(PathBuf::from)
        .context("no catalog feed: pass --feed or set feed.path in config")
}

pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let catalog = Catalog::from_file(path)
        .with_context(|| format!("failed to load catalog feed: {}", path.display()))?;
    tracing::info!(
        feed = %path.display(),
        root = catalog.root_tag(),
        elements = catalog.len(),
        "catalog loaded"
    );
    Ok(catalog)
}

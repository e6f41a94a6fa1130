//! `csync sync`: full reconciliation run against Postgres.

use std::time::Duration;

use anyhow::{Context, Result};
use csync_config::{secrets::resolve_database_url, ConfigMode, SyncSettings, UnusedKeyPolicy};
use csync_db::PgProductStore;
use csync_runtime::{sync_catalog, SyncOptions};

use super::{check_unused_keys, load_catalog, load_config, resolve_feed_path};

pub async fn run_sync(
    feed: Option<String>,
    config_paths: Vec<String>,
    dry_run: bool,
    strict_config: bool,
) -> Result<()> {
    let loaded = load_config(&config_paths)?;
    let policy = if strict_config {
        UnusedKeyPolicy::Fail
    } else {
        UnusedKeyPolicy::Warn
    };
    check_unused_keys(ConfigMode::Sync, &loaded, policy)?;

    let settings = SyncSettings::from_config_json(&loaded.config_json)?;
    let feed_path = resolve_feed_path(feed, settings.feed_path.as_deref())?;
    let dry_run = dry_run || settings.dry_run;

    // Resolve the secret before touching the feed so a misconfigured run
    // fails fast.
    let db_url = resolve_database_url(&settings)?;
    let catalog = load_catalog(&feed_path)?;

    let pool = csync_db::connect_with_timeout(
        db_url.expose(),
        settings.max_connections,
        Duration::from_secs(settings.connect_timeout_secs),
    )
    .await
    .with_context(|| format!("product store from {}", db_url.env_var()))?;
    let store = PgProductStore::new(pool);

    let report = sync_catalog(&store, &catalog, SyncOptions { dry_run }).await?;
    let t = report.totals();

    println!("run_id={}", report.run_id);
    println!("config_hash={}", loaded.config_hash);
    println!("feed={}", feed_path.display());
    println!("dry_run={}", report.dry_run);
    println!("requested={}", report.requested);
    println!("existing={}", report.existing);
    println!("inserted={}", t.inserted);
    println!("updated={}", t.updated);
    println!("unchanged={}", t.unchanged);
    println!("skipped={}", t.skipped);
    println!("duplicate={}", t.duplicate);
    println!("failed={}", t.failed);

    Ok(())
}

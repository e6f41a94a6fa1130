//! `csync inspect`: build every document and print it, one JSON object per
//! line on stdout. Elements that build nothing are reported on stderr.

use anyhow::{Context, Result};
use csync_config::{ConfigMode, SyncSettings, UnusedKeyPolicy};
use csync_feed::DocumentBuilder;

use super::{check_unused_keys, load_catalog, load_config, resolve_feed_path};

pub fn run_inspect(feed: Option<String>, config_paths: Vec<String>) -> Result<()> {
    let loaded = load_config(&config_paths)?;
    check_unused_keys(ConfigMode::Inspect, &loaded, UnusedKeyPolicy::Warn)?;

    let settings = SyncSettings::from_config_json(&loaded.config_json)?;
    let feed_path = resolve_feed_path(feed, settings.feed_path.as_deref())?;
    let catalog = load_catalog(&feed_path)?;
    let builder = DocumentBuilder::new().context("document builder init failed")?;

    let mut built = 0usize;
    let mut skipped = 0usize;
    for (position, element) in catalog.products().iter().enumerate() {
        match builder.build(element) {
            Ok(doc) => {
                let line = serde_json::to_string(&doc).context("document serialize failed")?;
                println!("{line}");
                built += 1;
            }
            Err(e) => {
                eprintln!("skip position={position} reason={e}");
                skipped += 1;
            }
        }
    }

    eprintln!("documents={built} skipped={skipped}");
    Ok(())
}

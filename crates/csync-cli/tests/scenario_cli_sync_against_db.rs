//! `csync sync` end to end against Postgres: first run inserts, second run
//! writes nothing.
//!
//! DB-backed test, skipped if CSYNC_DATABASE_URL is not set.

use predicates::prelude::*;

const FEED: &str = r#"<Products>
  <Product ProductId="CSYNC-CLI-DB-1">
    <ProductDetails>
      <ProductDetail Name="Price" Value="75,50"/>
      <ProductDetail Name="ProductType" Value="Pantolon"/>
      <ProductDetail Name="Color" Value="Haki"/>
    </ProductDetails>
    <Description><![CDATA[<ul><li><strong>Ürün Bilgisi:</strong> Kargo pantolon</li></ul>]]></Description>
  </Product>
</Products>"#;

#[allow(deprecated)]
#[test]
fn cli_sync_is_idempotent_against_postgres() {
    let url = match std::env::var("CSYNC_DATABASE_URL") {
        Ok(v) => v,
        Err(_) => {
            eprintln!("SKIP: CSYNC_DATABASE_URL not set");
            return;
        }
    };

    let dir = tempfile::tempdir().unwrap();
    let feed = dir.path().join("feed.xml");
    std::fs::write(&feed, FEED).unwrap();
    let feed = feed.to_str().unwrap().to_string();

    let run = |args: &[&str]| {
        let mut cmd = assert_cmd::Command::cargo_bin("csync").unwrap();
        cmd.env("CSYNC_DATABASE_URL", &url).args(args);
        cmd.assert()
    };

    run(&["db", "migrate"])
        .success()
        .stdout(predicate::str::contains("migrations_applied=true"));

    // The product may exist from an earlier run; either way the second pass
    // must be a no-op.
    run(&["sync", "--feed", &feed]).success();

    run(&["sync", "--feed", &feed])
        .success()
        .stdout(predicate::str::contains("inserted=0"))
        .stdout(predicate::str::contains("updated=0"))
        .stdout(predicate::str::contains("unchanged=1"));

    run(&["sync", "--feed", &feed, "--dry-run"])
        .success()
        .stdout(predicate::str::contains("dry_run=true"));

    run(&["db", "status"])
        .success()
        .stdout(predicate::str::contains("has_products_table=true"));
}

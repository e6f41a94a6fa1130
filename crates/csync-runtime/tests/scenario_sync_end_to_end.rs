//! Full sync passes over small catalogs against the in-memory store.

use anyhow::Result;
use chrono::{TimeZone, Utc};
use serde_json::json;

use csync_db::{MemoryProductStore, StoreOp};
use csync_feed::{Catalog, DocumentBuilder};
use csync_runtime::{sync_catalog, RecordOutcome, SyncOptions};
use csync_schemas::NewProduct;

const CATALOG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Products>
  <Product ProductId="EXISTING-1">
    <Images><Image Path="e1.jpg"/></Images>
    <ProductDetails>
      <ProductDetail Name="Price" Value="100,00"/>
      <ProductDetail Name="Quantity" Value="5"/>
      <ProductDetail Name="ProductType" Value="Etek"/>
      <ProductDetail Name="Color" Value="Mavi"/>
    </ProductDetails>
    <Description><![CDATA[<ul><li><strong>Ürün Bilgisi:</strong> Kalem etek</li></ul>]]></Description>
  </Product>
  <Product ProductId="NEW-1">
    <Images>
      <Image Path="n1-a.jpg"/>
      <Image Path="n1-b.jpg"/>
    </Images>
    <ProductDetails>
      <ProductDetail Name="Price" Value="19,99"/>
      <ProductDetail Name="DiscountedPrice" Value="5,00"/>
      <ProductDetail Name="Quantity" Value="12"/>
      <ProductDetail Name="ProductType" Value="Elbise"/>
      <ProductDetail Name="Color" Value="Siyah"/>
      <ProductDetail Name="Color" Value="Bej"/>
      <ProductDetail Name="Series" Value="2S-2M"/>
    </ProductDetails>
    <Description><![CDATA[<ul>
      <li><strong>Ürün Bilgisi:</strong> Uzun kollu elbise</li>
      <li><strong>Kumaş Bilgisi:</strong> %100 Pamuk</li>
      <li><strong>Model Ölçüleri:</strong> Boy 1.76</li>
    </ul>]]></Description>
  </Product>
  <Product Name="missing identifier">
    <ProductDetails><ProductDetail Name="Price" Value="1,00"/></ProductDetails>
  </Product>
</Products>"#;

fn catalog(src: &str) -> Catalog {
    Catalog::parse_str(src).expect("test catalog must parse")
}

/// Seed the store with EXISTING-1 exactly as the feed describes it.
fn seeded_store(cat: &Catalog) -> MemoryProductStore {
    let builder = DocumentBuilder::new().unwrap();
    let doc = builder.build(&cat.products()[0]).unwrap();
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
    MemoryProductStore::with_products([NewProduct::from_document(doc)], at)
}

#[tokio::test]
async fn scenario_existing_identical_new_inserted_missing_id_skipped() -> Result<()> {
    let cat = catalog(CATALOG);
    let store = seeded_store(&cat);

    let report = sync_catalog(&store, &cat, SyncOptions::default()).await?;

    assert_eq!(report.requested, 2, "element without id contributes no code");
    assert_eq!(report.existing, 1);
    assert_eq!(store.fetch_count()?, 1, "exactly one bulk lookup");

    assert_eq!(report.outcome_for("EXISTING-1"), Some(&RecordOutcome::Unchanged));
    assert_eq!(report.outcome_for("NEW-1"), Some(&RecordOutcome::Inserted));
    assert!(matches!(
        report.records[2].outcome,
        RecordOutcome::Skipped { .. }
    ));
    assert_eq!(report.records[2].stock_code, None);

    // Only one write: the insert of NEW-1.
    let ops = store.ops()?;
    assert_eq!(ops.len(), 1);
    let StoreOp::Insert { stock_code, fields } = &ops[0] else {
        panic!("expected insert, got {:?}", ops[0]);
    };
    assert_eq!(stock_code, "NEW-1");
    assert_eq!(fields["price"], json!(19.99));
    assert_eq!(fields["discounted_price"], json!(5.0));
    assert_eq!(fields["is_discounted"], json!(true));
    assert_eq!(fields["quantity"], json!(12));
    assert_eq!(fields["color"], json!(["Siyah", "Bej"]));
    assert_eq!(fields["images"], json!(["n1-a.jpg", "n1-b.jpg"]));
    assert_eq!(fields["name"], json!("Uzun kollu elbise"));
    assert_eq!(fields["fabric"], json!("%100 Pamuk"));
    assert_eq!(fields["model_measurements"], json!("Boy 1.76"));
    assert_eq!(fields["series"], json!("2S-2M"));
    assert_eq!(fields["sample_size"], json!("2S-2M"));
    assert_eq!(fields["price_unit"], json!("USD"));
    assert_eq!(fields["status"], json!("Active"));

    let t = report.totals();
    assert_eq!((t.inserted, t.unchanged, t.skipped), (1, 1, 1));
    assert!(report.is_clean());
    Ok(())
}

#[tokio::test]
async fn scenario_changed_price_updates_only_that_product() -> Result<()> {
    let cat = catalog(CATALOG);
    let store = seeded_store(&cat);
    let seeded = store.get("EXISTING-1")?.unwrap();

    let changed = catalog(&CATALOG.replace("100,00", "89,90"));
    let report = sync_catalog(&store, &changed, SyncOptions::default()).await?;

    assert_eq!(
        report.outcome_for("EXISTING-1"),
        Some(&RecordOutcome::Updated {
            fields: vec!["price".to_string()]
        })
    );

    let after = store.get("EXISTING-1")?.unwrap();
    assert_eq!(after.field("price"), &json!(89.9));
    assert_eq!(after.field("status"), &json!("Active"));
    assert_eq!(after.created_at, seeded.created_at);
    assert!(after.updated_at > seeded.updated_at);
    Ok(())
}

#[tokio::test]
async fn scenario_catalog_without_identifiers_touches_nothing() -> Result<()> {
    let cat = catalog(
        r#"<Products>
             <Product><ProductDetails><ProductDetail Name="Price" Value="1"/></ProductDetails></Product>
             <Product ProductId="  "/>
           </Products>"#,
    );
    let store = MemoryProductStore::new();

    let report = sync_catalog(&store, &cat, SyncOptions::default()).await?;

    assert_eq!(report.requested, 0);
    assert_eq!(report.totals().skipped, 2);
    assert_eq!(report.totals().writes(), 0);
    assert!(store.ops()?.is_empty());
    assert!(store.is_empty()?);
    Ok(())
}

#[tokio::test]
async fn scenario_duplicate_stock_code_is_written_once() -> Result<()> {
    let cat = catalog(
        r#"<Products>
             <Product ProductId="D-1">
               <ProductDetails>
                 <ProductDetail Name="Price" Value="10"/>
                 <ProductDetail Name="ProductType" Value="Etek"/>
                 <ProductDetail Name="Color" Value="Lacivert"/>
               </ProductDetails>
               <Description>&lt;ul&gt;&lt;li&gt;&lt;strong&gt;Ürün Bilgisi:&lt;/strong&gt;ilk&lt;/li&gt;&lt;/ul&gt;</Description>
             </Product>
             <Product ProductId="D-1">
               <ProductDetails>
                 <ProductDetail Name="Price" Value="99"/>
                 <ProductDetail Name="ProductType" Value="Etek"/>
                 <ProductDetail Name="Color" Value="Lacivert"/>
               </ProductDetails>
             </Product>
           </Products>"#,
    );
    let store = MemoryProductStore::new();

    let report = sync_catalog(&store, &cat, SyncOptions::default()).await?;

    assert_eq!(report.records[0].outcome, RecordOutcome::Inserted);
    assert_eq!(report.records[1].outcome, RecordOutcome::Duplicate);
    assert_eq!(store.ops()?.len(), 1);
    assert_eq!(
        store.get("D-1")?.unwrap().field("price"),
        &json!(10.0),
        "first occurrence wins"
    );
    Ok(())
}

#[tokio::test]
async fn scenario_write_failure_is_per_record() -> Result<()> {
    let cat = catalog(
        r#"<Products>
             <Product ProductId="NO-NAME">
               <ProductDetails>
                 <ProductDetail Name="Price" Value="10"/>
                 <ProductDetail Name="ProductType" Value="Etek"/>
                 <ProductDetail Name="Color" Value="Lacivert"/>
               </ProductDetails>
             </Product>
             <Product ProductId="BROKEN">
               <ProductDetails>
                 <ProductDetail Name="Price" Value="10"/>
                 <ProductDetail Name="ProductType" Value="Etek"/>
                 <ProductDetail Name="Color" Value="Lacivert"/>
               </ProductDetails>
               <Description>&lt;ul&gt;&lt;li&gt;&lt;strong&gt;Ürün Bilgisi:&lt;/strong&gt;x&lt;/li&gt;&lt;/ul&gt;</Description>
             </Product>
             <Product ProductId="OK">
               <ProductDetails>
                 <ProductDetail Name="Price" Value="10"/>
                 <ProductDetail Name="ProductType" Value="Etek"/>
                 <ProductDetail Name="Color" Value="Lacivert"/>
               </ProductDetails>
               <Description>&lt;ul&gt;&lt;li&gt;&lt;strong&gt;Ürün Bilgisi:&lt;/strong&gt;y&lt;/li&gt;&lt;/ul&gt;</Description>
             </Product>
           </Products>"#,
    );
    let store = MemoryProductStore::new();
    store.fail_writes_for("BROKEN")?;

    let report = sync_catalog(&store, &cat, SyncOptions::default()).await?;

    let RecordOutcome::Failed { error } = report.outcome_for("NO-NAME").unwrap() else {
        panic!("missing name must be rejected by the store");
    };
    assert!(error.contains("name"), "got: {error}");
    assert!(matches!(
        report.outcome_for("BROKEN"),
        Some(RecordOutcome::Failed { .. })
    ));
    assert_eq!(report.outcome_for("OK"), Some(&RecordOutcome::Inserted));
    assert_eq!(report.totals().failed, 2);
    assert!(!report.is_clean());
    Ok(())
}

#[tokio::test]
async fn scenario_invalid_number_skips_record_and_continues() -> Result<()> {
    let cat = catalog(&CATALOG.replace("19,99", "ücretsiz"));
    let store = seeded_store(&cat);

    let report = sync_catalog(&store, &cat, SyncOptions::default()).await?;

    let Some(RecordOutcome::Skipped { reason }) = report.outcome_for("NEW-1") else {
        panic!("NEW-1 must be skipped");
    };
    assert!(reason.contains("price"), "got: {reason}");
    assert_eq!(report.outcome_for("EXISTING-1"), Some(&RecordOutcome::Unchanged));
    assert!(store.ops()?.is_empty());
    Ok(())
}

#[tokio::test]
async fn scenario_bulk_lookup_failure_is_fatal() -> Result<()> {
    let cat = catalog(CATALOG);
    let store = MemoryProductStore::new();
    store.fail_fetch()?;

    let err = sync_catalog(&store, &cat, SyncOptions::default())
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("bulk lookup"));
    assert!(store.ops()?.is_empty());
    Ok(())
}

#[tokio::test]
async fn scenario_dry_run_plans_without_writing() -> Result<()> {
    let cat = catalog(&CATALOG.replace("100,00", "89,90"));
    let store = seeded_store(&catalog(CATALOG));

    let report = sync_catalog(&store, &cat, SyncOptions { dry_run: true }).await?;

    assert!(report.dry_run);
    assert_eq!(report.outcome_for("NEW-1"), Some(&RecordOutcome::Inserted));
    assert!(matches!(
        report.outcome_for("EXISTING-1"),
        Some(RecordOutcome::Updated { .. })
    ));
    assert!(store.ops()?.is_empty());
    assert_eq!(store.get("EXISTING-1")?.unwrap().field("price"), &json!(100.0));
    Ok(())
}

#[tokio::test]
async fn scenario_new_product_without_colours_is_not_inserted() -> Result<()> {
    let cat = catalog(
        r#"<Products>
             <Product ProductId="NO-COLOR">
               <ProductDetails>
                 <ProductDetail Name="Price" Value="10"/>
                 <ProductDetail Name="ProductType" Value="Etek"/>
               </ProductDetails>
               <Description>&lt;ul&gt;&lt;li&gt;&lt;strong&gt;Ürün Bilgisi:&lt;/strong&gt;renksiz&lt;/li&gt;&lt;/ul&gt;</Description>
             </Product>
           </Products>"#,
    );
    let store = MemoryProductStore::new();

    let report = sync_catalog(&store, &cat, SyncOptions::default()).await?;

    let Some(RecordOutcome::Failed { error }) = report.outcome_for("NO-COLOR") else {
        panic!("a product with no colours must be rejected on insert");
    };
    assert!(error.contains("color"), "got: {error}");
    assert!(store.ops()?.is_empty());
    assert!(store.is_empty()?);
    Ok(())
}

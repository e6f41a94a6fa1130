//! Whole-feed scenario: parse the sample catalog from disk and build every
//! product, checking each derived field.

use std::path::Path;

use csync_feed::{BuildError, Catalog, DocumentBuilder, FeedError};

fn sample() -> Catalog {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("catalog_sample.xml");
    Catalog::from_file(&path).expect("sample catalog must parse")
}

#[test]
fn sample_catalog_builds_two_documents_and_one_failure() {
    let catalog = sample();
    let builder = DocumentBuilder::new().unwrap();

    assert_eq!(catalog.len(), 3);
    assert_eq!(catalog.stock_codes(), vec!["MSE-1041", "MSE-2210"]);

    let results: Vec<_> = catalog.products().iter().map(|p| builder.build(p)).collect();
    assert!(results[0].is_ok());
    assert!(results[1].is_ok());
    assert!(matches!(
        results[2],
        Err(BuildError::MissingProductId { .. })
    ));
}

#[test]
fn blazer_document_has_every_derived_field() {
    let catalog = sample();
    let builder = DocumentBuilder::new().unwrap();
    let doc = builder.build(&catalog.products()[0]).unwrap();

    assert_eq!(doc.stock_code, "MSE-1041");
    assert_eq!(doc.price, Some(1299.90));
    assert_eq!(doc.discounted_price, Some(999.90));
    assert!(doc.is_discounted);
    assert_eq!(doc.quantity, 24);
    assert_eq!(doc.product_type.as_deref(), Some("Blazer"));
    assert_eq!(doc.color, vec!["Siyah", "Bej"]);
    assert_eq!(
        doc.images,
        vec![
            "https://cdn.example.com/mse-1041/1.jpg",
            "https://cdn.example.com/mse-1041/2.jpg"
        ]
    );
    assert_eq!(doc.series.as_deref(), Some("1S-2M-1L"));
    assert_eq!(doc.sample_size.as_deref(), Some("1S-2M-1L"));
    assert_eq!(
        doc.name.as_deref(),
        Some("Oversize kesim astarlı blazer ceket"),
        "item after model measurements must not overwrite the name"
    );
    assert_eq!(doc.fabric.as_deref(), Some("%65 Polyester %35 Viskon"));
    assert_eq!(doc.product_measurements.as_deref(), Some("Boy 75 cm"));
    assert_eq!(doc.model_measurements.as_deref(), Some("Boy 1.76, Göğüs 84"));
}

#[test]
fn skirt_document_reads_escaped_description_and_empty_discount() {
    let catalog = sample();
    let builder = DocumentBuilder::new().unwrap();
    let doc = builder.build(&catalog.products()[1]).unwrap();

    assert_eq!(doc.stock_code, "MSE-2210");
    assert_eq!(doc.price, Some(449.50));
    assert_eq!(doc.discounted_price, None);
    assert!(!doc.is_discounted);
    assert_eq!(doc.quantity, 0);
    assert_eq!(doc.color, vec!["Lacivert"]);
    assert!(doc.images.is_empty());
    assert_eq!(doc.name.as_deref(), Some("Pileli midi etek"));
    assert_eq!(doc.fabric, None);
}

#[test]
fn malformed_feed_is_fatal() {
    let err = Catalog::parse_str("<Products><Product ProductId=\"X\"></Products>").unwrap_err();
    assert!(matches!(err, FeedError::Xml { .. }));
}

#[test]
fn feed_written_to_temp_file_round_trips_through_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("feed.xml");
    std::fs::write(&path, r#"<Products><Product ProductId="T-1"/></Products>"#).unwrap();

    let catalog = Catalog::from_file(&path).unwrap();
    assert_eq!(catalog.stock_codes(), vec!["T-1"]);
}

use engine::catalog::load_catalog;
use engine::{Catalog, CatalogError};
use std::fs;
use tempfile::tempdir;

#[test]
fn loads_sample_catalog() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../sample_data/vehicles.csv");
    let records: Catalog = load_catalog(path).unwrap();
    assert_eq!(records.len(), 16);
    assert_eq!(records[0].model_name, "Amaze");
    assert_eq!(records[15].model_name, "Brio");
    let prologue = records.iter().find(|r| r.model_name == "Prologue").unwrap();
    // empty numeric cells default to zero
    assert_eq!(prologue.mileage, 0.0);
    assert_eq!(prologue.engine_cc, 0.0);
    let brio = records.iter().find(|r| r.model_name == "Brio").unwrap();
    assert_eq!(brio.features, "");
}

#[test]
fn loads_jsonl_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("catalog.jsonl");
    fs::write(
        &path,
        "{\"Model_Name\":\"City\",\"Price\":11.8,\"Mileage\":17.8,\"Seating\":5,\"Engine_CC\":1498,\"Engine_Type\":\"Petrol\",\"Features\":\"Sunroof\",\"Body_Type\":\"Sedan\"}\n\
         {\"Model_Name\":\"Amaze\",\"Price\":7.2,\"Mileage\":18.6,\"Seating\":5,\"Engine_CC\":1199,\"Engine_Type\":\"Petrol\"}\n",
    )
    .unwrap();
    let records = load_catalog(&path).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].body_type, "");
}

#[test]
fn rejects_unknown_extension() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("catalog.xlsx");
    fs::write(&path, "not a catalog").unwrap();
    assert!(matches!(load_catalog(&path), Err(CatalogError::UnsupportedFormat(ext)) if ext == "xlsx"));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    assert!(matches!(load_catalog(dir.path().join("absent.csv")), Err(CatalogError::Io(_))));
}

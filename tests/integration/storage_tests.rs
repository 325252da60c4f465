//! Integration tests for the storage sinks
//!
//! The rollback tests inject a failure at a fixed record index with a SQLite
//! trigger installed on the database before the sink opens it.

use listing_harvest::extract::ProductRecord;
use listing_harvest::storage::{
    initialize_schema, save_to_sinks, CsvFileSink, SqliteSink, StorageError, StorageSink,
};
use rusqlite::Connection;
use std::path::Path;
use tempfile::TempDir;

fn records(n: usize) -> Vec<ProductRecord> {
    (0..n)
        .map(|i| {
            let mut record = ProductRecord::named(format!("Product {}", i));
            record.brand = "Acme".to_string();
            record.price = format!("{}0 TL", i + 1);
            record
        })
        .collect()
}

/// Makes any insert of a product named `name` abort
fn install_poison_trigger(db_path: &Path, name: &str) {
    let conn = Connection::open(db_path).expect("Failed to open DB");
    initialize_schema(&conn).expect("Failed to create schema");
    conn.execute_batch(&format!(
        "CREATE TRIGGER reject_poison BEFORE INSERT ON products
         WHEN NEW.name = '{}'
         BEGIN SELECT RAISE(ABORT, 'poisoned record'); END;",
        name
    ))
    .expect("Failed to install trigger");
}

#[test]
fn test_failed_insert_rolls_back_whole_save() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("products.db");
    install_poison_trigger(&db_path, "Product 3");

    let sink = SqliteSink::new(&db_path);
    let result = sink.save(&records(5));

    assert!(matches!(result, Err(StorageError::Sqlite(_))));
    assert_eq!(sink.count_products().unwrap(), 0);
}

#[test]
fn test_rollback_keeps_earlier_saves() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("products.db");
    let sink = SqliteSink::new(&db_path);

    sink.save(&records(2)).unwrap();
    install_poison_trigger(&db_path, "Product 1");

    assert!(sink.save(&records(4)).is_err());
    assert_eq!(sink.count_products().unwrap(), 2);
}

#[test]
fn test_database_usable_after_failed_save() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("products.db");
    install_poison_trigger(&db_path, "Product 0");

    let sink = SqliteSink::new(&db_path);
    assert!(sink.save(&records(3)).is_err());

    let id = sink
        .insert_product(&ProductRecord::named("manual entry"))
        .unwrap();
    let products = sink.list_products().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, id);
}

#[test]
fn test_sinks_are_independent() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("products.db");
    install_poison_trigger(&db_path, "Product 2");

    let csv = CsvFileSink::new(dir.path().join("products.csv"));
    let db = SqliteSink::new(&db_path);
    let data = records(3);

    let reports = save_to_sinks(&data, &[&db, &csv]);

    assert!(reports[0].result.is_err());
    assert_eq!(reports[1].result.as_ref().unwrap(), &3);
    assert_eq!(db.count_products().unwrap(), 0);

    let mut reader = csv::Reader::from_path(csv.path()).unwrap();
    let written: Vec<ProductRecord> = reader.deserialize().map(|r| r.unwrap()).collect();
    assert_eq!(written, data);
}

#[test]
fn test_same_records_in_both_sinks() {
    let dir = TempDir::new().unwrap();
    let csv = CsvFileSink::new(dir.path().join("products.csv"));
    let db = SqliteSink::new(dir.path().join("products.db"));
    let data = records(4);

    for report in save_to_sinks(&data, &[&csv, &db]) {
        assert_eq!(report.result.unwrap(), 4, "sink {}", report.sink);
    }

    let stored: Vec<ProductRecord> = db
        .list_products()
        .unwrap()
        .into_iter()
        .map(|p| p.record)
        .collect();
    assert_eq!(stored, data);
}

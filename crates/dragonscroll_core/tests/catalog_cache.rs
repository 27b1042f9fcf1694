use dragonscroll_core::db::open_db;
use dragonscroll_core::{CatalogCache, CatalogError, ErrorKind, RecordStore};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn loaded_catalog() -> (Arc<RecordStore>, CatalogCache) {
    let records = Arc::new(RecordStore::open_in_memory().unwrap());
    let catalog = CatalogCache::new(Arc::clone(&records));
    catalog.load().unwrap();
    (records, catalog)
}

// File-backed catalog whose store gives up immediately on a locked database.
fn file_catalog(path: &Path) -> (Arc<RecordStore>, CatalogCache) {
    let conn = open_db(path).unwrap();
    conn.busy_timeout(Duration::ZERO).unwrap();
    let records = Arc::new(RecordStore::from_connection(conn).unwrap());
    let catalog = CatalogCache::new(Arc::clone(&records));
    catalog.load().unwrap();
    (records, catalog)
}

fn lock_exclusively(path: &Path) -> Connection {
    let blocker = Connection::open(path).unwrap();
    blocker.execute_batch("BEGIN EXCLUSIVE;").unwrap();
    blocker
}

fn assert_in_sync(records: &RecordStore, catalog: &CatalogCache) {
    assert_eq!(catalog.snapshot().unwrap(), records.get_all().unwrap());
    assert_eq!(catalog.len().unwrap(), records.get_count().unwrap());
}

#[test]
fn load_mirrors_existing_records() {
    let records = Arc::new(RecordStore::open_in_memory().unwrap());
    records.insert("Dune", "Herbert").unwrap();
    records.insert("1984", "Orwell").unwrap();

    let catalog = CatalogCache::new(Arc::clone(&records));
    catalog.load().unwrap();

    assert!(catalog.is_loaded());
    assert!(!catalog.is_empty().unwrap());
    assert_in_sync(&records, &catalog);
}

#[test]
fn add_appends_store_assigned_record() {
    let (records, catalog) = loaded_catalog();

    let dune = catalog.add("Dune", "Herbert").unwrap();
    let orwell = catalog.add("  1984 ", "Orwell").unwrap();

    assert_eq!(dune.id, 1);
    assert_eq!(orwell.id, 2);
    assert_eq!(orwell.title, "1984");
    assert_eq!(catalog.get(1).unwrap(), orwell);
    assert_in_sync(&records, &catalog);
}

#[test]
fn add_with_blank_field_changes_nothing() {
    let (records, catalog) = loaded_catalog();
    catalog.add("Dune", "Herbert").unwrap();

    let err = catalog.add("", "Author").unwrap_err();
    assert!(matches!(err, CatalogError::Validation(_)));
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = catalog.add("Title", "").unwrap_err();
    assert!(matches!(err, CatalogError::Validation(_)));

    assert_eq!(catalog.len().unwrap(), 1);
    assert_in_sync(&records, &catalog);
}

#[test]
fn remove_at_deletes_from_store_and_cache() {
    let (records, catalog) = loaded_catalog();
    catalog.add("Dune", "Herbert").unwrap();
    let orwell = catalog.add("1984", "Orwell").unwrap();

    let removed = catalog.remove_at(0).unwrap();

    assert_eq!(removed.title, "Dune");
    assert_eq!(catalog.snapshot().unwrap(), vec![orwell]);
    assert_eq!(records.get_count().unwrap(), 1);
    assert_in_sync(&records, &catalog);
}

#[test]
fn remove_at_out_of_range_changes_nothing() {
    let (records, catalog) = loaded_catalog();
    catalog.add("Dune", "Herbert").unwrap();

    let err = catalog.remove_at(1).unwrap_err();

    assert!(matches!(
        err,
        CatalogError::IndexOutOfRange { index: 1, len: 1 }
    ));
    assert_eq!(err.kind(), ErrorKind::IndexOutOfRange);
    assert_in_sync(&records, &catalog);
}

#[test]
fn remove_at_of_row_deleted_behind_cache_reports_not_found_and_resyncs() {
    let (records, catalog) = loaded_catalog();
    let dune = catalog.add("Dune", "Herbert").unwrap();
    catalog.add("1984", "Orwell").unwrap();
    records.delete(dune.id).unwrap();

    let err = catalog.remove_at(0).unwrap_err();

    assert!(matches!(err, CatalogError::NotFound(id) if id == dune.id));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_in_sync(&records, &catalog);
}

#[test]
fn ids_are_not_reused_across_add_remove_add() {
    let (records, catalog) = loaded_catalog();

    let first = catalog.add("Dune", "Herbert").unwrap();
    catalog.remove_at(0).unwrap();
    let second = catalog.add("Dune", "Herbert").unwrap();

    assert_ne!(first.id, second.id);
    assert_in_sync(&records, &catalog);
}

#[test]
fn nuke_empties_both_sides_and_restarts_ids() {
    let (records, catalog) = loaded_catalog();
    catalog.add("Dune", "Herbert").unwrap();
    catalog.add("1984", "Orwell").unwrap();

    catalog.nuke().unwrap();

    assert!(catalog.is_empty().unwrap());
    assert_eq!(records.get_count().unwrap(), 0);
    assert_eq!(catalog.add("Emma", "Austen").unwrap().id, 1);
    assert_in_sync(&records, &catalog);
}

#[test]
fn scripted_operation_sequence_keeps_cache_and_store_equal() {
    let (records, catalog) = loaded_catalog();

    // Deterministic pseudo-random walk over add/remove_at.
    let mut seed: u32 = 0x2545_f491;
    for step in 0..200 {
        seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        let len = catalog.len().unwrap();
        if len == 0 || seed % 3 != 0 {
            catalog
                .add(&format!("Title {step}"), &format!("Author {step}"))
                .unwrap();
        } else {
            let index = (seed as usize / 7) % len;
            catalog.remove_at(index).unwrap();
        }
        assert_in_sync(&records, &catalog);
    }
}

#[test]
fn reload_after_restart_rebuilds_from_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("books.sqlite3");

    let before = {
        let records = Arc::new(RecordStore::open(&path).unwrap());
        let catalog = CatalogCache::new(Arc::clone(&records));
        catalog.load().unwrap();
        catalog.add("Dune", "Herbert").unwrap();
        catalog.add("1984", "Orwell").unwrap();
        catalog.remove_at(0).unwrap();
        catalog.snapshot().unwrap()
    };

    let records = Arc::new(RecordStore::open(&path).unwrap());
    let catalog = CatalogCache::new(Arc::clone(&records));
    catalog.load().unwrap();

    assert_eq!(catalog.snapshot().unwrap(), before);
}

#[test]
fn concurrent_adds_keep_cache_and_store_equal() {
    let (records, catalog) = loaded_catalog();
    let catalog = Arc::new(catalog);

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let catalog = Arc::clone(&catalog);
            thread::spawn(move || {
                for n in 0..10 {
                    catalog
                        .add(&format!("Title {worker}-{n}"), "Author")
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(catalog.len().unwrap(), 40);
    assert_in_sync(&records, &catalog);
}

#[test]
fn add_failing_in_store_leaves_no_phantom_entry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("books.sqlite3");
    let (records, catalog) = file_catalog(&path);
    catalog.add("Dune", "Herbert").unwrap();

    let blocker = lock_exclusively(&path);
    let err = catalog.add("1984", "Orwell").unwrap_err();
    blocker.execute_batch("ROLLBACK;").unwrap();

    assert_eq!(err.kind(), ErrorKind::StorageFault);
    assert_eq!(catalog.len().unwrap(), 1);
    assert_in_sync(&records, &catalog);
}

#[test]
fn remove_at_failing_in_store_keeps_entry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("books.sqlite3");
    let (records, catalog) = file_catalog(&path);
    let dune = catalog.add("Dune", "Herbert").unwrap();

    let blocker = lock_exclusively(&path);
    let err = catalog.remove_at(0).unwrap_err();
    blocker.execute_batch("ROLLBACK;").unwrap();

    assert_eq!(err.kind(), ErrorKind::StorageFault);
    assert_eq!(catalog.snapshot().unwrap(), vec![dune]);
    assert_in_sync(&records, &catalog);
}

#[test]
fn load_picks_up_rows_inserted_through_the_store() {
    let (records, catalog) = loaded_catalog();
    catalog.add("Dune", "Herbert").unwrap();
    catalog.records().insert("1984", "Orwell").unwrap();
    assert_eq!(catalog.len().unwrap(), 1);

    catalog.load().unwrap();

    assert_eq!(catalog.len().unwrap(), 2);
    assert_in_sync(&records, &catalog);
}

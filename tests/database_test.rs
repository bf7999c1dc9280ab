use reldb::common::DbError;
use reldb::engine::Database;
use reldb::record::ColumnType;

use tempfile::TempDir;

fn open_db() -> (Database, TempDir) {
    let dir = TempDir::new().unwrap();
    let db = Database::open(dir.path()).unwrap();
    (db, dir)
}

fn int_str4() -> Vec<ColumnType> {
    vec![ColumnType::Int, ColumnType::Str(4)]
}

#[test]
fn test_create_insert_scan() {
    let (mut db, _dir) = open_db();
    db.create_relation("r", int_str4()).unwrap();

    db.insert("r", vec!["1".into(), "abcd".into()]).unwrap();
    db.insert("r", vec!["2".into(), "efgh".into()]).unwrap();

    let all = db.scan_all("r").unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].values(), &["1", "abcd"]);
    assert_eq!(all[1].values(), &["2", "efgh"]);

    let schema = db.schema_of("r").unwrap();
    assert_eq!(schema.record_size(), 12);
    assert_eq!(db.relation_names(), ["r"]);
}

#[test]
fn test_validation_rejects_before_writing() {
    let (mut db, _dir) = open_db();
    db.create_relation("r", int_str4()).unwrap();

    assert!(matches!(
        db.insert("r", vec!["x".into(), "abcd".into()]),
        Err(DbError::SchemaMismatch(_))
    ));
    assert!(matches!(
        db.insert("r", vec!["1".into(), "abcde".into()]),
        Err(DbError::ValueTooLong { column: 1, max: 4 })
    ));
    assert!(matches!(
        db.insert("r", vec!["1".into()]),
        Err(DbError::SchemaMismatch(_))
    ));
    assert!(db.scan_all("r").unwrap().is_empty());
}

#[test]
fn test_unknown_relation_and_column() {
    let (mut db, _dir) = open_db();
    db.create_relation("r", int_str4()).unwrap();

    assert!(matches!(
        db.scan_all("missing"),
        Err(DbError::RelationNotFound(_))
    ));
    assert!(matches!(
        db.scan_where("r", 2, "x"),
        Err(DbError::ColumnOutOfRange { column: 2, count: 2 })
    ));
    assert!(matches!(
        db.create_relation("r", int_str4()),
        Err(DbError::RelationExists(_))
    ));
}

#[test]
fn test_scan_where_and_delete_where() {
    let (mut db, _dir) = open_db();
    db.create_relation("r", int_str4()).unwrap();

    for (id, name) in [("1", "aaaa"), ("2", "bbbb"), ("1", "cccc")] {
        db.insert("r", vec![id.into(), name.into()]).unwrap();
    }

    let ones = db.scan_where("r", 0, "1").unwrap();
    assert_eq!(ones.len(), 2);

    assert_eq!(db.delete_where("r", 0, "1").unwrap(), 2);
    let rest = db.scan_all("r").unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].value(1), Some("bbbb"));

    assert_eq!(db.delete_where("r", 0, "9").unwrap(), 0);
}

#[test]
fn test_index_lookup_matches_scan() {
    let (mut db, _dir) = open_db();
    db.create_relation("r", int_str4()).unwrap();

    for i in 0..50 {
        let key = (i * 7) % 10;
        db.insert("r", vec![key.to_string(), "xxxx".into()]).unwrap();
    }
    db.build_index("r", 0, 2).unwrap();

    for key in 0..10 {
        let via_index: Vec<_> = db
            .lookup_by_index("r", 0, key)
            .unwrap()
            .iter()
            .map(|r| r.rid().unwrap())
            .collect();
        let mut via_scan: Vec<_> = db
            .scan_where("r", 0, &key.to_string())
            .unwrap()
            .iter()
            .map(|r| r.rid().unwrap())
            .collect();
        via_scan.sort();
        assert_eq!(via_index, via_scan, "key {}", key);
    }
    assert!(db.lookup_by_index("r", 0, 99).unwrap().is_empty());
}

#[test]
fn test_index_requires_integer_values() {
    let (mut db, _dir) = open_db();
    db.create_relation("r", int_str4()).unwrap();
    db.insert("r", vec!["1".into(), "abcd".into()]).unwrap();

    assert!(matches!(
        db.build_index("r", 1, 2),
        Err(DbError::SchemaMismatch(_))
    ));
    assert!(matches!(
        db.lookup_by_index("r", 0, 1),
        Err(DbError::IndexNotFound { .. })
    ));
}

#[test]
fn test_equi_join() {
    let (mut db, _dir) = open_db();
    db.create_relation("r", int_str4()).unwrap();
    db.create_relation("s", int_str4()).unwrap();

    db.insert("r", vec!["1".into(), "xxxx".into()]).unwrap();
    db.insert("r", vec!["2".into(), "yyyy".into()]).unwrap();
    db.insert("s", vec!["1".into(), "pppp".into()]).unwrap();
    db.insert("s", vec!["3".into(), "qqqq".into()]).unwrap();

    let rows = db.equi_join("r", 0, "s", 0).unwrap();
    assert_eq!(rows, vec![vec![
        "1".to_string(),
        "xxxx".to_string(),
        "1".to_string(),
        "pppp".to_string(),
    ]]);
}

#[test]
fn test_join_with_duplicates_crosses() {
    let (mut db, _dir) = open_db();
    db.create_relation("r", int_str4()).unwrap();
    db.create_relation("s", int_str4()).unwrap();

    for name in ["aaaa", "bbbb"] {
        db.insert("r", vec!["1".into(), name.into()]).unwrap();
    }
    for name in ["cccc", "dddd"] {
        db.insert("s", vec!["1".into(), name.into()]).unwrap();
    }
    assert_eq!(db.equi_join("r", 0, "s", 0).unwrap().len(), 4);
}

#[test]
fn test_flush_writes_heap_file() {
    let dir = TempDir::new().unwrap();
    let mut db = Database::open(dir.path()).unwrap();
    db.create_relation("r", int_str4()).unwrap();
    db.insert("r", vec!["1".into(), "abcd".into()]).unwrap();
    db.flush_and_close().unwrap();

    // header page plus one data page on disk
    let len = std::fs::metadata(dir.path().join("rel_0.tbl")).unwrap().len();
    assert_eq!(len, 2 * reldb::common::PAGE_SIZE as u64);
}

#[test]
fn test_reset_database() {
    let (mut db, dir) = open_db();
    db.create_relation("r", int_str4()).unwrap();
    db.insert("r", vec!["1".into(), "abcd".into()]).unwrap();

    db.reset_database().unwrap();
    assert!(db.relation_names().is_empty());
    assert!(matches!(
        db.scan_all("r"),
        Err(DbError::RelationNotFound(_))
    ));
    assert!(!dir.path().join("rel_0.tbl").exists());

    // the name and file index are free again
    db.create_relation("r", int_str4()).unwrap();
    db.insert("r", vec!["2".into(), "efgh".into()]).unwrap();
    assert_eq!(db.scan_all("r").unwrap().len(), 1);
}

#[test]
fn test_small_pool_end_to_end() {
    let dir = TempDir::new().unwrap();
    let mut db = Database::with_frame_count(dir.path(), 2).unwrap();
    db.create_relation("r", vec![ColumnType::Int, ColumnType::Str(1021)]).unwrap();

    for i in 0..10 {
        db.insert("r", vec![i.to_string(), "v".into()]).unwrap();
    }
    db.build_index("r", 0, 2).unwrap();
    assert_eq!(db.scan_all("r").unwrap().len(), 10);
    assert_eq!(db.lookup_by_index("r", 0, 7).unwrap().len(), 1);
    db.flush_and_close().unwrap();
}

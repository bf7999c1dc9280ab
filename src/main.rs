use reldb::engine::Database;
use reldb::record::ColumnType;

fn main() -> reldb::Result<()> {
    env_logger::init();

    println!("Reldb - a minimal relational storage engine in Rust");
    println!("===================================================\n");

    let base_dir = "demo_data";
    let mut db = Database::open(base_dir)?;
    println!("Opened database at: {}", base_dir);

    // Two small relations to join
    db.create_relation("emp", vec![ColumnType::Int, ColumnType::Str(8)])?;
    db.create_relation("dept", vec![ColumnType::Int, ColumnType::Str(8)])?;
    println!("Created relations: {:?}\n", db.relation_names());

    let employees = [
        ("1", "alice"),
        ("2", "bob"),
        ("1", "carol"),
        ("3", "dave"),
    ];
    for (dept, name) in employees {
        let rid = db.insert("emp", vec![dept.into(), name.into()])?;
        println!("Inserted {} into emp at {}", name, rid);
    }
    db.insert("dept", vec!["1".into(), "eng".into()])?;
    db.insert("dept", vec!["2".into(), "sales".into()])?;

    println!("\nFull scan of emp:");
    for record in db.scan_all("emp")? {
        println!("  {:?}", record.values());
    }

    // Index the department column and look up department 1
    db.build_index("emp", 0, 2)?;
    println!("\nEmployees in department 1 (via index):");
    for record in db.lookup_by_index("emp", 0, 1)? {
        println!("  {:?}", record.values());
    }

    println!("\nemp join dept on department id:");
    for row in db.equi_join("emp", 0, "dept", 0)? {
        println!("  {:?}", row);
    }

    let removed = db.delete_where("emp", 0, "3")?;
    println!("\nDeleted {} record(s) from emp", removed);

    db.flush_and_close()?;
    println!("Flushed all pages to disk");

    db.reset_database()?;
    std::fs::remove_dir_all(base_dir).ok();
    println!("\nDemo completed successfully!");
    Ok(())
}

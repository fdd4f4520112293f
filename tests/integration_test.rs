use std::fs;

use colfam::{
    Catalog, Command, CommandOutput, CreateMode, FamilyValues, PutAction, Shell, StoreOptions,
};
use tempfile::TempDir;

fn values(pairs: &[(&str, &str, &str)]) -> FamilyValues {
    let mut fv = FamilyValues::new();
    for (family, property, value) in pairs {
        fv.entry(family.to_string())
            .or_default()
            .insert(property.to_string(), value.to_string());
    }
    fv
}

#[test]
fn test_basic_operations() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = Catalog::open(temp_dir.path().join("tables"), StoreOptions::default()).unwrap();

    catalog
        .create("users", &["personal", "work"], Some(3), CreateMode::FailIfExists)
        .unwrap();

    let id = catalog
        .insert(
            "users",
            &values(&[
                ("personal", "name", "alice"),
                ("personal", "city", "paris"),
                ("work", "title", "engineer"),
            ]),
        )
        .unwrap();

    catalog
        .update("users", &id, &values(&[("personal", "city", "lyon")]))
        .unwrap();

    let row = catalog.get_row("users", &id).unwrap();
    assert_eq!(row.latest("personal", "name"), Some("alice"));
    assert_eq!(row.latest("personal", "city"), Some("lyon"));
    assert_eq!(row.latest("work", "title"), Some("engineer"));
    assert_eq!(row.cell("personal", "city").unwrap().len(), 2);
    assert_eq!(row.num_cells(), 3);

    let snapshot = catalog.describe("users").unwrap();
    assert_eq!(snapshot.row_count, 1);
    assert!(snapshot.modified > snapshot.created);
}

#[test]
fn test_describe_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = Catalog::open(temp_dir.path(), StoreOptions::default()).unwrap();

    let created = catalog
        .create("metrics", &["cf1", "cf2"], Some(3), CreateMode::FailIfExists)
        .unwrap();
    let described = catalog.describe("metrics").unwrap();

    assert_eq!(described, created);
    assert_eq!(described.column_families, vec!["cf1", "cf2"]);
    assert!(!described.disabled);
    assert_eq!(described.max_versions, 3);
}

#[test]
fn test_pattern_drop() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = Catalog::open(temp_dir.path(), StoreOptions::default()).unwrap();

    for name in ["user_logs", "user_sessions", "orders"] {
        catalog
            .create(name, &["cf"], None, CreateMode::FailIfExists)
            .unwrap();
    }
    catalog.disable("user_logs").unwrap();
    catalog.disable("orders").unwrap();

    let report = catalog.drop_all("user_*").unwrap();
    assert_eq!(report.dropped, vec!["user_logs".to_string()]);
    assert_eq!(report.num_matched(), 2);
    let (skipped, reason) = &report.skipped[0];
    assert_eq!(skipped, "user_sessions");
    assert!(reason.is_table_enabled());

    assert!(!temp_dir.path().join("user_logs.json").exists());
    assert!(temp_dir.path().join("user_sessions.json").exists());
    assert!(temp_dir.path().join("orders.json").exists());
    assert!(catalog.describe("orders").unwrap().disabled);
}

#[test]
fn test_drop_all_question_mark_and_class() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = Catalog::open(temp_dir.path(), StoreOptions::default()).unwrap();

    for name in ["t1", "t2", "t3", "t10"] {
        catalog
            .create(name, &["cf"], None, CreateMode::FailIfExists)
            .unwrap();
        catalog.disable(name).unwrap();
    }

    let report = catalog.drop_all("t[12]").unwrap();
    assert_eq!(report.dropped, vec!["t1", "t2"]);

    let report = catalog.drop_all("t?").unwrap();
    assert_eq!(report.dropped, vec!["t3"]);

    assert_eq!(catalog.names(), vec!["t10"]);
}

#[test]
fn test_lifecycle_gate_leaves_record_unchanged() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = Catalog::open(temp_dir.path(), StoreOptions::default()).unwrap();

    catalog
        .create("users", &["personal"], None, CreateMode::FailIfExists)
        .unwrap();
    catalog
        .insert("users", &values(&[("personal", "name", "alice")]))
        .unwrap();

    let path = temp_dir.path().join("users.json");
    let before = fs::read(&path).unwrap();

    assert!(
        catalog
            .alter("users", "people", &["work"])
            .unwrap_err()
            .is_table_enabled()
    );
    assert!(catalog.drop("users").unwrap_err().is_table_enabled());

    assert_eq!(fs::read(&path).unwrap(), before);
    assert!(!temp_dir.path().join("people.json").exists());
}

#[test]
fn test_writes_allowed_while_disabled() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = Catalog::open(temp_dir.path(), StoreOptions::default()).unwrap();

    catalog
        .create("users", &["personal"], None, CreateMode::FailIfExists)
        .unwrap();
    catalog.disable("users").unwrap();

    catalog
        .insert("users", &values(&[("personal", "name", "alice")]))
        .unwrap();
    assert_eq!(catalog.count_rows("users").unwrap(), 1);
}

#[test]
fn test_shell_session() {
    let temp_dir = TempDir::new().unwrap();
    let shell = Shell::open(temp_dir.path(), StoreOptions::default()).unwrap();

    shell
        .execute(Command::Create {
            name: "users".to_string(),
            column_families: vec!["personal".to_string()],
            max_versions: Some(2),
            overwrite: false,
        })
        .unwrap();

    let err = shell
        .execute(Command::Create {
            name: "users".to_string(),
            column_families: vec!["other".to_string()],
            max_versions: None,
            overwrite: false,
        })
        .unwrap_err();
    assert!(err.is_already_exists());

    let id = match shell
        .execute(Command::Put {
            table: "users".to_string(),
            action: PutAction::parse("insert", None).unwrap(),
            values: values(&[("personal", "name", "alice")]),
        })
        .unwrap()
    {
        CommandOutput::Inserted(id) => id,
        other => panic!("unexpected output: {other:?}"),
    };

    for name in ["bob", "carol"] {
        shell
            .execute(Command::Put {
                table: "users".to_string(),
                action: PutAction::parse("update", Some(&id.to_string())).unwrap(),
                values: values(&[("personal", "name", name)]),
            })
            .unwrap();
    }

    match shell
        .execute(Command::Cell {
            table: "users".to_string(),
            row: id,
            family: "personal".to_string(),
            property: "name".to_string(),
        })
        .unwrap()
    {
        CommandOutput::Cell(history) => {
            let kept: Vec<&str> = history.iter().map(|(_, v)| v).collect();
            assert_eq!(kept, vec!["bob", "carol"]);
        }
        other => panic!("unexpected output: {other:?}"),
    }

    match shell
        .execute(Command::Scan {
            table: "users".to_string(),
        })
        .unwrap()
    {
        CommandOutput::Rows(rows) => {
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].0, id);
        }
        other => panic!("unexpected output: {other:?}"),
    }

    match shell
        .execute(Command::Export {
            table: "users".to_string(),
        })
        .unwrap()
    {
        CommandOutput::Export(json) => assert!(json.contains("carol")),
        other => panic!("unexpected output: {other:?}"),
    }
}

use assert_cmd::Command;
use predicates::prelude::*;
use uuid::Uuid;

fn statedb() -> Command {
    Command::cargo_bin("statedb").unwrap()
}

#[test]
fn create_then_show_log_then_transact_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("db.log");
    let schema = dir.path().join("schema.json");
    let txn = dir.path().join("txn.json");

    std::fs::write(
        &schema,
        serde_json::json!({
            "name": "mini",
            "version": "1",
            "checksum": "",
            "tables": {"T": {"columns": {"k": {"type": "string"}, "v": {"type": "integer"}}}}
        })
        .to_string(),
    )
    .unwrap();

    statedb().args(["create", db.to_str().unwrap(), schema.to_str().unwrap()]).assert().success();

    statedb()
        .args(["show-log", db.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("schema"));

    let uuid = Uuid::new_v4();
    std::fs::write(&txn, serde_json::json!({ "T": { uuid.to_string(): {"k": "a", "v": 1} } }).to_string()).unwrap();

    statedb().args(["transact", db.to_str().unwrap(), txn.to_str().unwrap()]).assert().success();

    statedb()
        .args(["show-log", db.to_str().unwrap(), "-m"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 inserted"));

    statedb().args(["db-name", db.to_str().unwrap()]).assert().success().stdout("mini\n");
}

#[test]
fn query_does_not_persist_a_change() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("db.log");
    let schema = dir.path().join("schema.json");
    let txn = dir.path().join("txn.json");

    std::fs::write(
        &schema,
        serde_json::json!({"name": "mini", "tables": {"T": {"columns": {"k": {"type": "string"}}}}}).to_string(),
    )
    .unwrap();
    statedb().args(["create", db.to_str().unwrap(), schema.to_str().unwrap()]).assert().success();

    let uuid = Uuid::new_v4();
    std::fs::write(&txn, serde_json::json!({ "T": { uuid.to_string(): {"k": "a"} } }).to_string()).unwrap();

    statedb().args(["query", db.to_str().unwrap(), txn.to_str().unwrap()]).assert().success();

    // A log with just the schema record is still exactly one record after
    // a read-only query -- nothing was appended.
    let contents = std::fs::read_to_string(&db).unwrap();
    assert_eq!(contents.lines().filter(|l| l.starts_with("SDB1")).count(), 1);
}

#[test]
fn needs_conversion_reports_yes_for_a_different_schema() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("db.log");
    let schema = dir.path().join("schema.json");
    let other_schema = dir.path().join("other.json");

    std::fs::write(
        &schema,
        serde_json::json!({"name": "mini", "tables": {"T": {"columns": {"k": {"type": "string"}}}}}).to_string(),
    )
    .unwrap();
    std::fs::write(
        &other_schema,
        serde_json::json!({"name": "mini", "tables": {"T": {"columns": {"k": {"type": "string"}, "v": {"type": "integer"}}}}}).to_string(),
    )
    .unwrap();
    statedb().args(["create", db.to_str().unwrap(), schema.to_str().unwrap()]).assert().success();

    statedb()
        .args(["needs-conversion", db.to_str().unwrap(), schema.to_str().unwrap()])
        .assert()
        .success()
        .stdout("no\n");
    statedb()
        .args(["needs-conversion", db.to_str().unwrap(), other_schema.to_str().unwrap()])
        .assert()
        .success()
        .stdout("yes\n");
}

#[test]
fn compact_shrinks_a_log_to_two_records() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("db.log");
    let schema = dir.path().join("schema.json");
    let txn = dir.path().join("txn.json");

    std::fs::write(
        &schema,
        serde_json::json!({"name": "mini", "tables": {"T": {"columns": {"k": {"type": "string"}}}}}).to_string(),
    )
    .unwrap();
    statedb().args(["create", db.to_str().unwrap(), schema.to_str().unwrap()]).assert().success();

    for value in ["a", "b"] {
        let uuid = Uuid::new_v4();
        std::fs::write(&txn, serde_json::json!({ "T": { uuid.to_string(): {"k": value} } }).to_string()).unwrap();
        statedb().args(["transact", db.to_str().unwrap(), txn.to_str().unwrap()]).assert().success();
    }

    statedb().args(["compact", db.to_str().unwrap()]).assert().success();

    let contents = std::fs::read_to_string(&db).unwrap();
    assert_eq!(contents.lines().filter(|l| l.starts_with("SDB1")).count(), 2);
}

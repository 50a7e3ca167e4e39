// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use rust_decimal::Decimal;
use serde_json::Value;
use tabungan::commands::{self, doctor, exporter};
use tabungan::ledger::{TxFilter, list_transactions};
use tabungan::registry::{accounts, categories};
use tabungan::{cli, db, settings};
use tempfile::tempdir;

fn run(conn: &mut Connection, args: &[&str]) {
    let mut argv = vec!["tabungan"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    commands::dispatch(conn, &matches).unwrap();
}

fn seeded() -> Connection {
    let mut conn = db::open_in_memory().unwrap();
    run(&mut conn, &["account", "add", "--name", "Cash", "--balance", "1,000,000"]);
    run(&mut conn, &["account", "add", "--name", "BCA"]);
    run(&mut conn, &["member", "add", "--name", "Ayah", "--role", "father"]);
    run(
        &mut conn,
        &["category", "add", "--kind", "expense", "--name", "Makan", "--account", "Cash"],
    );
    conn
}

fn balance_of(conn: &Connection, name: &str) -> Decimal {
    accounts::find_by_name(conn, name).unwrap().unwrap().balance
}

#[test]
fn tx_commands_move_balances() {
    let mut conn = seeded();
    run(
        &mut conn,
        &["tx", "add", "--type", "expense", "--amount", "25000", "--category", "Makan",
          "--date", "2025-02-01", "--member", "Ayah"],
    );
    assert_eq!(balance_of(&conn, "Cash"), Decimal::from(975_000));

    run(
        &mut conn,
        &["tx", "add", "--type", "transfer", "--amount", "100000", "--from", "Cash", "--to", "BCA"],
    );
    assert_eq!(balance_of(&conn, "BCA"), Decimal::from(100_000));

    let txs = list_transactions(&conn, &TxFilter::default()).unwrap();
    let expense = txs.iter().find(|t| t.expense_category_id.is_some()).unwrap();
    let id = expense.id.to_string();
    run(&mut conn, &["tx", "edit", id.as_str(), "--amount", "40000"]);
    assert_eq!(balance_of(&conn, "Cash"), Decimal::from(860_000));

    run(&mut conn, &["tx", "rm", id.as_str()]);
    assert_eq!(balance_of(&conn, "Cash"), Decimal::from(900_000));
    assert_eq!(list_transactions(&conn, &TxFilter::default()).unwrap().len(), 1);
}

#[test]
fn registry_commands_edit_in_place() {
    let mut conn = seeded();
    run(&mut conn, &["account", "edit", "BCA", "--number", "123-456"]);
    let bca = accounts::find_by_name(&conn, "BCA").unwrap().unwrap();
    assert_eq!(bca.account_number.as_deref(), Some("123-456"));

    run(&mut conn, &["category", "edit", "Makan", "--kind", "expense", "--target", "500000"]);
    let makan = categories::list(&conn, None).unwrap().remove(0);
    assert_eq!(makan.target, Some(Decimal::from(500_000)));
    assert!(makan.storage_account_id.is_some());

    run(&mut conn, &["config", "set", "currency", "usd"]);
    assert_eq!(settings::currency(&conn).unwrap(), "USD");
}

#[test]
fn export_writes_names_oldest_first() {
    let mut conn = seeded();
    run(&mut conn, &["tx", "add", "--type", "income", "--amount", "5", "--to", "BCA", "--date", "2025-01-02"]);
    run(&mut conn, &["tx", "add", "--type", "income", "--amount", "7", "--to", "Cash", "--date", "2025-01-01"]);

    let dir = tempdir().unwrap();
    let json_path = dir.path().join("tx.json");
    let n = exporter::export_transactions(&conn, "json", &json_path).unwrap();
    assert_eq!(n, 2);
    let parsed: Value = serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(parsed[0]["date"], "2025-01-01");
    assert_eq!(parsed[0]["to_account"], "Cash");
    assert_eq!(parsed[1]["type"], "income");

    let csv_path = dir.path().join("tx.csv");
    exporter::export_transactions(&conn, "csv", &csv_path).unwrap();
    let mut rdr = csv::Reader::from_path(&csv_path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert!(headers.iter().any(|h| h == "from_account"));
    assert_eq!(rdr.records().count(), 2);

    assert!(exporter::export_transactions(&conn, "xml", &dir.path().join("tx.xml")).is_err());
}

#[test]
fn doctor_reports_dangling_references() {
    let mut conn = seeded();
    assert!(doctor::diagnose(&conn).unwrap().is_empty());

    run(&mut conn, &["tx", "add", "--type", "income", "--amount", "5", "--to", "BCA"]);
    run(&mut conn, &["account", "rm", "BCA"]);
    run(&mut conn, &["account", "add", "--name", "Antam", "--gold"]);

    let issues: Vec<String> = doctor::diagnose(&conn)
        .unwrap()
        .into_iter()
        .map(|row| row[0].clone())
        .collect();
    assert!(issues.contains(&"missing_account".to_string()));
    assert!(issues.contains(&"gold_account_no_weight".to_string()));
}

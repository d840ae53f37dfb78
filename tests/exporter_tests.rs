// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use pocketbook::commands::{categories, exporter, expenses, items};
use pocketbook::{cli, db};
use rusqlite::Connection;
use serde_json::json;
use tempfile::tempdir;

fn base_conn() -> Connection {
    let conn = db::open_in_memory().unwrap();
    categories::add(&conn, "Groceries").unwrap();
    items::add(&conn, "Vegetables", "Groceries").unwrap();
    expenses::add_line(
        &conn,
        NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
        "Vegetables",
        "12.34".parse().unwrap(),
    )
    .unwrap();
    conn
}

#[test]
fn export_expenses_streams_pretty_json() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.json");
    let out_str = out_path.to_string_lossy().to_string();

    let matches = cli::build_cli().get_matches_from([
        "pocketbook",
        "export",
        "expenses",
        "--format",
        "json",
        "--out",
        out_str.as_str(),
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(&conn, export_m).unwrap();
    } else {
        panic!("no export subcommand");
    }

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(
        parsed,
        json!([
            {
                "id": 1,
                "date": "2025-01-02",
                "item": "Vegetables",
                "category": "Groceries",
                "amount": "12.34"
            }
        ])
    );
}

#[test]
fn export_expenses_writes_csv_with_header() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.csv");
    let out_str = out_path.to_string_lossy().to_string();

    let matches = cli::build_cli().get_matches_from([
        "pocketbook",
        "export",
        "expenses",
        "--out",
        out_str.as_str(),
    ]);
    let (_, export_m) = matches.subcommand().unwrap();
    exporter::handle(&conn, export_m).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[0], "id,date,item,category,amount");
    assert_eq!(lines[1], "1,2025-01-02,Vegetables,Groceries,12.34");
    assert_eq!(lines.len(), 2);
}

#[test]
fn export_expenses_rejects_unknown_format() {
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.unknown");
    let out_str = out_path.to_string_lossy().to_string();

    let parsed = cli::build_cli().try_get_matches_from([
        "pocketbook",
        "export",
        "expenses",
        "--format",
        "xml",
        "--out",
        out_str.as_str(),
    ]);
    assert!(parsed.is_err());
    assert!(!out_path.exists());
}

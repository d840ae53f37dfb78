// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, NaiveDateTime};
use pocketbook::commands::{debts, doctor, emis};
use pocketbook::models::{Cadence, DebtType};
use pocketbook::schedule::PlanRequest;
use pocketbook::db;
use rusqlite::{Connection, params};

fn seeded() -> (Connection, i64, i64) {
    let conn = db::open_in_memory().unwrap();
    let plan = emis::create_plan(
        &conn,
        "Bike",
        &PlanRequest {
            start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            count: 3,
            amount: "100".parse().unwrap(),
            cadence: Cadence::Monthly,
        },
    )
    .unwrap();
    let at = NaiveDateTime::parse_from_str("2025-01-01 08:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
    let debt = debts::create(&conn, "Mina", "80".parse().unwrap(), DebtType::Given, None, at).unwrap();
    debts::settle(&conn, debt, "30".parse().unwrap(), "", at).unwrap();
    (conn, plan, debt)
}

fn issues(conn: &Connection) -> Vec<String> {
    doctor::check(conn).unwrap().into_iter().map(|(k, _)| k).collect()
}

#[test]
fn consistent_data_has_no_issues() {
    let (conn, _, _) = seeded();
    assert!(issues(&conn).is_empty());
}

#[test]
fn detects_schedule_drift() {
    let (conn, plan, _) = seeded();
    conn.execute(
        "DELETE FROM installments WHERE emi_id=?1 AND seq=3",
        params![plan],
    )
    .unwrap();
    conn.execute(
        "UPDATE installments SET status='PAID' WHERE emi_id=?1 AND seq=1",
        params![plan],
    )
    .unwrap();
    let found = issues(&conn);
    assert!(found.contains(&"emi_count_mismatch".to_string()));
    assert!(found.contains(&"emi_sum_mismatch".to_string()));
    assert!(found.contains(&"installment_paid_date".to_string()));
}

#[test]
fn detects_settlement_drift() {
    let (conn, _, debt) = seeded();
    conn.execute(
        "UPDATE debts SET amount_settled='80' WHERE id=?1",
        params![debt],
    )
    .unwrap();
    let found = issues(&conn);
    assert!(found.contains(&"debt_history_mismatch".to_string()));
    assert!(found.contains(&"debt_status_mismatch".to_string()));
}

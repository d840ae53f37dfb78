// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use pocketbook::commands::reports::{self, GroupBy};
use pocketbook::commands::{categories, dashboard, debts, emis, expenses, items};
use pocketbook::models::{Cadence, DebtType};
use pocketbook::schedule::PlanRequest;
use pocketbook::db;
use rusqlite::Connection;
use rust_decimal::Decimal;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn with_spend() -> Connection {
    let conn = db::open_in_memory().unwrap();
    categories::add(&conn, "Food").unwrap();
    categories::add(&conn, "Home").unwrap();
    items::add(&conn, "Groceries", "Food").unwrap();
    items::add(&conn, "Snacks", "Food").unwrap();
    items::add(&conn, "Rent", "Home").unwrap();
    items::add(&conn, "Plants", "Home").unwrap();
    expenses::add_line(&conn, d("2025-01-03"), "Groceries", dec("40")).unwrap();
    expenses::add_line(&conn, d("2025-01-03"), "Snacks", dec("10")).unwrap();
    expenses::add_line(&conn, d("2025-01-15"), "Rent", dec("150")).unwrap();
    expenses::add_line(&conn, d("2025-03-02"), "Groceries", dec("25.50")).unwrap();
    expenses::add_line(&conn, d("2024-12-31"), "Snacks", dec("99")).unwrap();
    conn
}

#[test]
fn monthly_totals_always_twelve_rows() {
    let conn = with_spend();
    let months = reports::monthly_totals(&conn, 2025).unwrap();
    assert_eq!(months.len(), 12);
    assert_eq!(months[0].month, "January");
    assert_eq!(months[0].total, dec("200"));
    assert_eq!(months[1].total, Decimal::ZERO);
    assert_eq!(months[2].month_num, 3);
    assert_eq!(months[2].total, dec("25.50"));

    let empty = reports::monthly_totals(&conn, 2030).unwrap();
    assert_eq!(empty.len(), 12);
    assert!(empty.iter().all(|m| m.total.is_zero()));
}

#[test]
fn category_breakdown_sorted_with_percentages() {
    let conn = with_spend();
    let shares = reports::category_breakdown(&conn, 2025, 1).unwrap();
    assert_eq!(shares.len(), 2);
    assert_eq!(shares[0].category, "Home");
    assert_eq!(shares[0].total, dec("150"));
    assert_eq!(shares[0].percent, dec("75.0"));
    assert_eq!(shares[1].percent, dec("25.0"));

    assert!(reports::category_breakdown(&conn, 2025, 2).unwrap().is_empty());
    assert!(reports::category_breakdown(&conn, 2025, 13).is_err());
}

#[test]
fn trend_groups_by_category_day_and_month() {
    let conn = with_spend();
    let t = reports::trend(&conn, Some(d("2025-01-01")), None).unwrap();
    assert_eq!(t.category_distribution[0].name, "Home");
    assert_eq!(t.daily_trend.len(), 3);
    assert_eq!(t.daily_trend[0].name, "2025-01-03");
    assert_eq!(t.daily_trend[0].value, dec("50"));
    assert_eq!(
        t.monthly_trend.iter().map(|m| m.name.as_str()).collect::<Vec<_>>(),
        vec!["2025-01", "2025-03"]
    );
}

#[test]
fn pivot_rows_total_their_item_columns() {
    let conn = with_spend();
    let table = reports::pivot(&conn, d("2025-01-01"), d("2025-03-31"), GroupBy::Daily).unwrap();
    assert_eq!(
        table.columns,
        vec!["Date", "Groceries", "Plants", "Rent", "Snacks", "Total"]
    );
    assert_eq!(table.rows.len(), 3);
    for row in &table.rows {
        assert_eq!(row.values.len(), 4);
        assert_eq!(row.values.iter().copied().sum::<Decimal>(), row.total);
    }
    assert_eq!(table.rows[0].total, dec("50"));

    let monthly = reports::pivot(&conn, d("2025-01-01"), d("2025-03-31"), GroupBy::Monthly).unwrap();
    assert_eq!(monthly.rows.len(), 2);
    assert_eq!(monthly.rows[0].label, "January 2025");
    assert_eq!(monthly.rows[0].total, dec("200"));

    assert!(reports::pivot(&conn, d("2025-03-31"), d("2025-01-01"), GroupBy::Daily).is_err());
    assert!("weekly".parse::<GroupBy>().is_err());
}

#[test]
fn dashboard_combines_month_debts_and_plans() {
    let conn = with_spend();
    debts::create(
        &conn,
        "Asha",
        dec("300"),
        DebtType::Borrowed,
        None,
        chrono::NaiveDateTime::parse_from_str("2025-01-01 10:00:00", "%Y-%m-%d %H:%M:%S").unwrap(),
    )
    .unwrap();
    let plan = emis::create_plan(
        &conn,
        "Fridge",
        &PlanRequest {
            start: d("2025-01-10"),
            end: d("2025-04-10"),
            count: 4,
            amount: dec("500"),
            cadence: Cadence::Monthly,
        },
    )
    .unwrap();
    let first = emis::installments_for(&conn, plan).unwrap()[0].id;
    emis::mark_paid(&conn, first, d("2025-01-10")).unwrap();

    let dash = dashboard::compute(&conn, d("2025-01-20")).unwrap();
    assert_eq!(dash.month, "2025-01");
    assert_eq!(dash.month_expense, dec("200"));
    assert_eq!(dash.pending_debt, dec("300"));
    assert_eq!(dash.active_emis, 1);
    assert_eq!(dash.emi_remaining, dec("1500"));
}

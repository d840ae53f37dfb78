// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use pocketbook::commands::{categories, expenses, items};
use pocketbook::{cli, db};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn seeded() -> Connection {
    let conn = db::open_in_memory().unwrap();
    categories::add(&conn, "Food").unwrap();
    categories::add(&conn, "Travel").unwrap();
    items::add(&conn, "Coffee", "Food").unwrap();
    items::add(&conn, "Lunch", "Food").unwrap();
    items::add(&conn, "Bus", "Travel").unwrap();
    conn
}

#[test]
fn lines_share_one_record_per_day() {
    let conn = seeded();
    expenses::add_line(&conn, d("2025-03-01"), "Coffee", dec("3.50")).unwrap();
    expenses::add_line(&conn, d("2025-03-01"), "Bus", dec("1.20")).unwrap();
    expenses::add_line(&conn, d("2025-03-02"), "Lunch", dec("9")).unwrap();

    let days: i64 = conn
        .query_row("SELECT COUNT(*) FROM daily_expenses", [], |r| r.get(0))
        .unwrap();
    assert_eq!(days, 2);

    let view = expenses::day_view(&conn, d("2025-03-01")).unwrap();
    assert_eq!(view.lines.len(), 2);
    assert_eq!(view.total, dec("4.70"));
    assert_eq!(view.lines[1].category, "Travel");

    let summaries = expenses::day_summaries(&conn, Some("2025-03")).unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].date, "2025-03-02");
    assert_eq!(summaries[1].lines, 2);
}

#[test]
fn unknown_item_and_non_positive_amount_are_rejected() {
    let conn = seeded();
    assert!(expenses::add_line(&conn, d("2025-03-01"), "Taxi", dec("5")).is_err());
    assert!(expenses::add_line(&conn, d("2025-03-01"), "Coffee", Decimal::ZERO).is_err());
    assert!(expenses::lines_between(&conn, None, None).unwrap().is_empty());
}

#[test]
fn item_listing_filters_by_category() {
    let conn = seeded();
    let food = items::list_rows(&conn, Some("Food")).unwrap();
    assert_eq!(
        food.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(),
        vec!["Coffee", "Lunch"]
    );
    let cats = categories::list_rows(&conn).unwrap();
    assert_eq!(cats[0].name, "Food");
    assert_eq!(cats[0].items, 2);
    assert!(categories::add(&conn, "Food").is_err());
}

#[test]
fn cli_expense_add_and_remove() {
    let conn = seeded();
    let m = cli::build_cli().get_matches_from([
        "pocketbook", "expense", "add", "--date", "2025-04-10", "--item", "Lunch", "--amount", "12.25",
    ]);
    let (_, sub) = m.subcommand().unwrap();
    expenses::handle(&conn, sub).unwrap();

    let lines = expenses::lines_between(&conn, Some(d("2025-04-01")), Some(d("2025-04-30"))).unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].amount, dec("12.25"));

    let id = lines[0].id.to_string();
    let m = cli::build_cli().get_matches_from(["pocketbook", "expense", "rm", "--id", id.as_str()]);
    let (_, sub) = m.subcommand().unwrap();
    expenses::handle(&conn, sub).unwrap();
    assert!(expenses::lines_between(&conn, None, None).unwrap().is_empty());
}

#[test]
fn failed_line_insert_leaves_no_empty_day() {
    let conn = seeded();
    conn.execute_batch(
        "CREATE TRIGGER block_lines BEFORE INSERT ON expense_items
         BEGIN SELECT RAISE(ABORT, 'lines blocked'); END;",
    )
    .unwrap();
    assert!(expenses::add_line(&conn, d("2025-04-01"), "Coffee", dec("3")).is_err());
    let days: i64 = conn
        .query_row("SELECT COUNT(*) FROM daily_expenses", [], |r| r.get(0))
        .unwrap();
    assert_eq!(days, 0);
}

#[test]
fn duplicate_names_are_reported_as_duplicates() {
    let conn = seeded();
    let err = categories::add(&conn, "Food").unwrap_err();
    assert_eq!(err.to_string(), "Category 'Food' already exists");
    let err = items::add(&conn, "Coffee", "Travel").unwrap_err();
    assert_eq!(err.to_string(), "Item 'Coffee' already exists");
}

#[test]
fn other_insert_failures_keep_their_cause() {
    let conn = seeded();
    conn.execute_batch("PRAGMA query_only = ON;").unwrap();
    let err = categories::add(&conn, "Rent").unwrap_err();
    assert_eq!(err.to_string(), "Failed to add category");
    assert!(!format!("{:#}", err).contains("already exists"));
    let err = items::add(&conn, "Taxi", "Travel").unwrap_err();
    assert_eq!(err.to_string(), "Failed to add item");
}

#[test]
fn removing_category_drops_its_items_and_lines() {
    let conn = seeded();
    expenses::add_line(&conn, d("2025-03-01"), "Bus", dec("2")).unwrap();
    let m = cli::build_cli().get_matches_from(["pocketbook", "category", "rm", "--name", "Travel"]);
    let (_, sub) = m.subcommand().unwrap();
    categories::handle(&conn, sub).unwrap();
    assert!(items::list_rows(&conn, Some("Travel")).unwrap().is_empty());
    assert!(expenses::lines_between(&conn, None, None).unwrap().is_empty());
}

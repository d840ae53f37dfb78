// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{ExpenseLine, check_money};
use crate::utils::{
    id_for_item, maybe_print_json, output_flags, parse_amount, parse_date, parse_month,
    pretty_table, stored_date, stored_decimal, today,
};
use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let date = date_or_today(sub)?;
            let item = sub.get_one::<String>("item").unwrap().trim();
            let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
            add_line(conn, date, item, amount)?;
            println!("Recorded {} for '{}' on {}", amount, item, date);
        }
        Some(("show", sub)) => show(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let n = conn.execute("DELETE FROM expense_items WHERE id=?1", params![id])?;
            if n == 0 {
                return Err(anyhow!("Expense line {} not found", id));
            }
            tracing::info!(line = id, "expense line removed");
            println!("Removed expense line {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn date_or_today(sub: &clap::ArgMatches) -> Result<NaiveDate> {
    match sub.get_one::<String>("date") {
        Some(raw) => parse_date(raw),
        None => Ok(today()),
    }
}

/// Returns the id of the day's record, creating it on first use.
pub fn ensure_day(conn: &Connection, date: NaiveDate) -> Result<i64> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM daily_expenses WHERE date=?1",
            params![date.to_string()],
            |r| r.get(0),
        )
        .optional()?;
    if let Some(id) = existing {
        return Ok(id);
    }
    conn.execute(
        "INSERT INTO daily_expenses(date) VALUES (?1)",
        params![date.to_string()],
    )?;
    tracing::debug!(%date, "created daily expense record");
    Ok(conn.last_insert_rowid())
}

pub fn add_line(conn: &Connection, date: NaiveDate, item: &str, amount: Decimal) -> Result<i64> {
    check_money(amount)?;
    let tx = conn.unchecked_transaction()?;
    let item_id = id_for_item(&tx, item)?;
    let day_id = ensure_day(&tx, date)?;
    tx.execute(
        "INSERT INTO expense_items(daily_expense_id, item_id, amount) VALUES (?1, ?2, ?3)",
        params![day_id, item_id, amount.to_string()],
    )?;
    let id = tx.last_insert_rowid();
    tx.commit()?;
    tracing::info!(line = id, %date, item, %amount, "expense recorded");
    Ok(id)
}

/// Every expense line with its item and category names, optionally bounded
/// by an inclusive date range.
pub fn lines_between(
    conn: &Connection,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Vec<ExpenseLine>> {
    let mut stmt = conn.prepare_cached(
        "SELECT e.id, d.date, i.name, c.name, e.amount
         FROM expense_items e
         JOIN daily_expenses d ON e.daily_expense_id=d.id
         JOIN items i ON e.item_id=i.id
         JOIN categories c ON i.category_id=c.id
         WHERE (?1 IS NULL OR d.date>=?1) AND (?2 IS NULL OR d.date<=?2)
         ORDER BY d.date, e.id",
    )?;
    let mut rows = stmt.query(params![
        start.map(|d| d.to_string()),
        end.map(|d| d.to_string())
    ])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let date: String = r.get(1)?;
        let amount: String = r.get(4)?;
        out.push(ExpenseLine {
            id: r.get(0)?,
            date: stored_date(&date)?,
            item: r.get(2)?,
            category: r.get(3)?,
            amount: stored_decimal(&amount, "expense amount")?,
        });
    }
    Ok(out)
}

#[derive(Debug, Serialize)]
pub struct DayView {
    pub date: NaiveDate,
    pub lines: Vec<ExpenseLine>,
    pub total: Decimal,
}

pub fn day_view(conn: &Connection, date: NaiveDate) -> Result<DayView> {
    let lines = lines_between(conn, Some(date), Some(date))?;
    let total = lines.iter().map(|l| l.amount).sum();
    Ok(DayView { date, lines, total })
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = output_flags(sub);
    let view = day_view(conn, date_or_today(sub)?)?;
    if !maybe_print_json(json_flag, jsonl_flag, &view)? {
        let rows = view
            .lines
            .iter()
            .map(|l| {
                vec![
                    l.id.to_string(),
                    l.item.clone(),
                    l.category.clone(),
                    format!("{:.2}", l.amount),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Id", "Item", "Category", "Amount"], rows));
        println!("Total for {}: {:.2}", view.date, view.total);
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct DaySummary {
    pub date: String,
    pub lines: i64,
    pub total: Decimal,
}

pub fn day_summaries(conn: &Connection, month: Option<&str>) -> Result<Vec<DaySummary>> {
    let mut stmt = conn.prepare(
        "SELECT d.date, e.amount
         FROM daily_expenses d LEFT JOIN expense_items e ON e.daily_expense_id=d.id
         WHERE ?1 IS NULL OR substr(d.date,1,7)=?1
         ORDER BY d.date DESC",
    )?;
    let mut rows = stmt.query(params![month])?;
    let mut out: Vec<DaySummary> = Vec::new();
    while let Some(r) = rows.next()? {
        let date: String = r.get(0)?;
        let amount: Option<String> = r.get(1)?;
        let is_new_day = out.last().is_none_or(|d| d.date != date);
        if is_new_day {
            out.push(DaySummary {
                date,
                lines: 0,
                total: Decimal::ZERO,
            });
        }
        if let (Some(day), Some(a)) = (out.last_mut(), amount) {
            day.lines += 1;
            day.total += stored_decimal(&a, "expense amount")?;
        }
    }
    Ok(out)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = output_flags(sub);
    let month = match sub.get_one::<String>("month") {
        Some(raw) => Some(parse_month(raw)?),
        None => None,
    };
    let data = day_summaries(conn, month.as_deref())?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows = data
            .iter()
            .map(|d| vec![d.date.clone(), d.lines.to_string(), format!("{:.2}", d.total)])
            .collect();
        println!("{}", pretty_table(&["Date", "Lines", "Total"], rows));
    }
    Ok(())
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::expenses::lines_between;
use crate::utils::{
    maybe_print_json, month_label, month_name, output_flags, parse_date, pretty_table, today,
};
use anyhow::{Context, Result, anyhow};
use chrono::{Datelike, NaiveDate};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("monthly", sub)) => monthly_cmd(conn, sub)?,
        Some(("categories", sub)) => categories_cmd(conn, sub)?,
        Some(("trend", sub)) => trend_cmd(conn, sub)?,
        Some(("table", sub)) => table_cmd(conn, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Serialize, PartialEq)]
pub struct MonthTotal {
    pub month: String,
    pub month_num: u32,
    pub total: Decimal,
}

/// Twelve rows, January through December, zero-filled.
pub fn monthly_totals(conn: &Connection, year: i32) -> Result<Vec<MonthTotal>> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1).context("Invalid year")?;
    let end = NaiveDate::from_ymd_opt(year, 12, 31).context("Invalid year")?;
    let mut totals = [Decimal::ZERO; 12];
    for line in lines_between(conn, Some(start), Some(end))? {
        totals[line.date.month0() as usize] += line.amount;
    }
    Ok((1..=12u32)
        .map(|m| MonthTotal {
            month: month_name(m).to_string(),
            month_num: m,
            total: totals[(m - 1) as usize],
        })
        .collect())
}

fn monthly_cmd(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = output_flags(sub);
    let year = sub
        .get_one::<i32>("year")
        .copied()
        .unwrap_or_else(|| today().year());
    let data = monthly_totals(conn, year)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows = data
            .iter()
            .map(|m| vec![m.month.clone(), format!("{:.2}", m.total)])
            .collect();
        println!("{}", pretty_table(&["Month", "Total"], rows));
    }
    Ok(())
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CategoryShare {
    pub category: String,
    pub total: Decimal,
    pub percent: Decimal,
}

/// Categories with spend in the given month, largest first.
pub fn category_breakdown(conn: &Connection, year: i32, month: u32) -> Result<Vec<CategoryShare>> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| anyhow!("Invalid month {}-{}", year, month))?;
    let end = start
        .checked_add_months(chrono::Months::new(1))
        .and_then(|d| d.pred_opt())
        .context("Month out of range")?;
    let mut agg: HashMap<String, Decimal> = HashMap::new();
    for line in lines_between(conn, Some(start), Some(end))? {
        *agg.entry(line.category).or_insert(Decimal::ZERO) += line.amount;
    }
    let grand: Decimal = agg.values().copied().sum();
    let mut items: Vec<_> = agg
        .into_iter()
        .filter(|(_, total)| *total > Decimal::ZERO)
        .collect();
    items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(items
        .into_iter()
        .map(|(category, total)| CategoryShare {
            category,
            total,
            percent: if grand.is_zero() {
                Decimal::ZERO
            } else {
                (total / grand * Decimal::ONE_HUNDRED).round_dp(1)
            },
        })
        .collect())
}

fn categories_cmd(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = output_flags(sub);
    let now = today();
    let year = sub.get_one::<i32>("year").copied().unwrap_or(now.year());
    let month = sub.get_one::<u32>("month").copied().unwrap_or(now.month());
    let data = category_breakdown(conn, year, month)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows = data
            .iter()
            .map(|c| {
                vec![
                    c.category.clone(),
                    format!("{:.2}", c.total),
                    format!("{:.1}%", c.percent),
                ]
            })
            .collect();
        println!("{} {}", month_name(month), year);
        println!("{}", pretty_table(&["Category", "Total", "Share"], rows));
    }
    Ok(())
}

#[derive(Debug, Serialize, PartialEq)]
pub struct NamedValue {
    pub name: String,
    pub value: Decimal,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Trend {
    pub category_distribution: Vec<NamedValue>,
    pub daily_trend: Vec<NamedValue>,
    pub monthly_trend: Vec<NamedValue>,
}

pub fn trend(conn: &Connection, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Trend> {
    let mut by_cat: HashMap<String, Decimal> = HashMap::new();
    let mut by_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    let mut by_month: BTreeMap<String, Decimal> = BTreeMap::new();
    for line in lines_between(conn, start, end)? {
        *by_cat.entry(line.category).or_insert(Decimal::ZERO) += line.amount;
        *by_day.entry(line.date).or_insert(Decimal::ZERO) += line.amount;
        *by_month
            .entry(line.date.format("%Y-%m").to_string())
            .or_insert(Decimal::ZERO) += line.amount;
    }
    let mut category_distribution: Vec<NamedValue> = by_cat
        .into_iter()
        .map(|(name, value)| NamedValue { name, value })
        .collect();
    category_distribution.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.name.cmp(&b.name)));
    Ok(Trend {
        category_distribution,
        daily_trend: by_day
            .into_iter()
            .map(|(d, value)| NamedValue {
                name: d.to_string(),
                value,
            })
            .collect(),
        monthly_trend: by_month
            .into_iter()
            .map(|(name, value)| NamedValue { name, value })
            .collect(),
    })
}

fn optional_date(sub: &clap::ArgMatches, key: &str) -> Result<Option<NaiveDate>> {
    sub.get_one::<String>(key).map(|s| parse_date(s)).transpose()
}

fn trend_cmd(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = output_flags(sub);
    let t = trend(conn, optional_date(sub, "start")?, optional_date(sub, "end")?)?;
    if !maybe_print_json(json_flag, jsonl_flag, &t)? {
        let pairs = |v: &[NamedValue]| -> Vec<Vec<String>> {
            v.iter()
                .map(|nv| vec![nv.name.clone(), format!("{:.2}", nv.value)])
                .collect()
        };
        println!("{}", pretty_table(&["Category", "Total"], pairs(&t.category_distribution)));
        println!("{}", pretty_table(&["Month", "Total"], pairs(&t.monthly_trend)));
        println!("{}", pretty_table(&["Date", "Total"], pairs(&t.daily_trend)));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    Daily,
    Monthly,
}

impl FromStr for GroupBy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "daily" => Ok(GroupBy::Daily),
            "monthly" => Ok(GroupBy::Monthly),
            other => Err(anyhow!("Unknown grouping '{}' (use daily|monthly)", other)),
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PivotRow {
    /// `YYYY-MM-DD` or `YYYY-MM`.
    pub key: String,
    pub label: String,
    pub values: Vec<Decimal>,
    pub total: Decimal,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PivotTable {
    pub columns: Vec<String>,
    pub rows: Vec<PivotRow>,
    pub group_by: GroupBy,
}

/// One column per item (alphabetical, every item even if unused), one row
/// per day or month with spend, and a row total.
pub fn pivot(conn: &Connection, start: NaiveDate, end: NaiveDate, group_by: GroupBy) -> Result<PivotTable> {
    if start > end {
        return Err(anyhow!("start {} is after end {}", start, end));
    }
    let mut stmt = conn.prepare("SELECT name FROM items ORDER BY name")?;
    let names = stmt.query_map([], |r| r.get::<_, String>(0))?;
    let mut item_names = Vec::new();
    for n in names {
        item_names.push(n?);
    }
    let index: HashMap<&str, usize> = item_names
        .iter()
        .enumerate()
        .map(|(i, n)| (n.as_str(), i))
        .collect();

    let mut grid: BTreeMap<String, Vec<Decimal>> = BTreeMap::new();
    for line in lines_between(conn, Some(start), Some(end))? {
        let key = match group_by {
            GroupBy::Daily => line.date.to_string(),
            GroupBy::Monthly => line.date.format("%Y-%m").to_string(),
        };
        let Some(&col) = index.get(line.item.as_str()) else {
            continue;
        };
        grid.entry(key)
            .or_insert_with(|| vec![Decimal::ZERO; item_names.len()])[col] += line.amount;
    }

    let rows = grid
        .into_iter()
        .map(|(key, values)| PivotRow {
            label: match group_by {
                GroupBy::Daily => key.clone(),
                GroupBy::Monthly => month_label(&key),
            },
            total: values.iter().copied().sum(),
            key,
            values,
        })
        .collect();

    let first = match group_by {
        GroupBy::Daily => "Date",
        GroupBy::Monthly => "Month",
    };
    let mut columns = vec![first.to_string()];
    columns.extend(item_names.iter().cloned());
    columns.push("Total".to_string());

    Ok(PivotTable {
        columns,
        rows,
        group_by,
    })
}

fn table_cmd(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = output_flags(sub);
    let start = parse_date(sub.get_one::<String>("start").unwrap())?;
    let end = parse_date(sub.get_one::<String>("end").unwrap())?;
    let group_by: GroupBy = sub.get_one::<String>("group-by").unwrap().parse()?;
    let table = pivot(conn, start, end, group_by)?;
    if !maybe_print_json(json_flag, jsonl_flag, &table)? {
        let headers: Vec<&str> = table.columns.iter().map(String::as_str).collect();
        let rows = table
            .rows
            .iter()
            .map(|r| {
                let mut cells = vec![r.label.clone()];
                cells.extend(r.values.iter().map(|v| format!("{:.2}", v)));
                cells.push(format!("{:.2}", r.total));
                cells
            })
            .collect();
        println!("{}", pretty_table(&headers, rows));
    }
    Ok(())
}

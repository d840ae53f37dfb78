// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::{debts, emis, expenses};
use crate::schedule::PlanStatus;
use crate::utils::{fmt_money, maybe_print_json, output_flags, pretty_table, today};
use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Serialize, PartialEq)]
pub struct Dashboard {
    pub month: String,
    pub month_expense: Decimal,
    pub pending_debt: Decimal,
    pub active_emis: usize,
    pub emi_remaining: Decimal,
}

pub fn compute(conn: &Connection, as_of: NaiveDate) -> Result<Dashboard> {
    let first = as_of.with_day(1).context("Invalid date")?;
    let month_expense = expenses::lines_between(conn, Some(first), Some(as_of))?
        .iter()
        .map(|l| l.amount)
        .sum();
    let pending_debt = debts::pending(conn, None)?.total_outstanding;
    let mut active_emis = 0;
    let mut emi_remaining = Decimal::ZERO;
    for view in emis::plan_views(conn)? {
        if view.progress.status == PlanStatus::Active {
            active_emis += 1;
        }
        emi_remaining += view.progress.remaining_amount;
    }
    Ok(Dashboard {
        month: first.format("%Y-%m").to_string(),
        month_expense,
        pending_debt,
        active_emis,
        emi_remaining,
    })
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches, currency: &str) -> Result<()> {
    let (json_flag, jsonl_flag) = output_flags(m);
    let d = compute(conn, today())?;
    if !maybe_print_json(json_flag, jsonl_flag, &d)? {
        let rows = vec![
            vec![
                format!("Expenses ({})", d.month),
                fmt_money(&d.month_expense, currency),
            ],
            vec!["Pending debts".into(), fmt_money(&d.pending_debt, currency)],
            vec!["Active EMIs".into(), d.active_emis.to_string()],
            vec!["EMI remaining".into(), fmt_money(&d.emi_remaining, currency)],
        ];
        println!("{}", pretty_table(&["", ""], rows));
    }
    Ok(())
}

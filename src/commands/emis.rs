// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::errors::FinanceError;
use crate::models::{Cadence, EmiPlan, Installment, InstallmentStatus};
use crate::schedule::{self, PlanRequest, Progress};
use crate::utils::{
    maybe_print_json, output_flags, parse_date, parse_decimal, pretty_table, stored_date,
    stored_decimal, today,
};
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use rusqlite::{Connection, Row, params};
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let title = sub.get_one::<String>("title").unwrap().trim();
            let req = plan_request(sub)?;
            let id = create_plan(conn, title, &req)?;
            let plan = load_plan(conn, id)?;
            println!(
                "Created EMI {} '{}': {} x {} = {:.2}",
                id,
                plan.title,
                plan.total_installments,
                plan.installment_amount,
                plan.total_amount()
            );
        }
        Some(("preview", sub)) => {
            let (json_flag, jsonl_flag) = output_flags(sub);
            let rows = schedule::generate(&plan_request(sub)?)?;
            if !maybe_print_json(json_flag, jsonl_flag, &rows)? {
                let data = rows
                    .iter()
                    .map(|r| {
                        vec![
                            r.seq.to_string(),
                            r.due_date.to_string(),
                            format!("{:.2}", r.amount),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["#", "Due", "Amount"], data));
            }
        }
        Some(("list", sub)) => list_cmd(conn, sub)?,
        Some(("show", sub)) => show_cmd(conn, sub)?,
        Some(("pay", sub)) => {
            let id = *sub.get_one::<i64>("installment").unwrap();
            let date = match sub.get_one::<String>("date") {
                Some(raw) => parse_date(raw)?,
                None => today(),
            };
            let inst = mark_paid(conn, id, date)?;
            let plan = load_plan(conn, inst.emi_id)?;
            let progress = schedule::progress(&plan, &installments_for(conn, plan.id)?);
            println!(
                "Installment {} of '{}' paid on {}; progress {}%, {:.2} remaining",
                inst.seq, plan.title, date, progress.percent, progress.remaining_amount
            );
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let n = conn.execute("DELETE FROM emis WHERE id=?1", params![id])?;
            if n == 0 {
                return Err(FinanceError::PlanNotFound(id).into());
            }
            tracing::info!(emi = id, "plan removed");
            println!("Removed EMI {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn plan_request(sub: &clap::ArgMatches) -> Result<PlanRequest> {
    Ok(PlanRequest {
        start: parse_date(sub.get_one::<String>("start").unwrap())?,
        end: parse_date(sub.get_one::<String>("end").unwrap())?,
        count: *sub.get_one::<i64>("count").unwrap(),
        amount: parse_decimal(sub.get_one::<String>("amount").unwrap())?,
        cadence: sub
            .get_one::<String>("cadence")
            .map(|s| s.parse::<Cadence>())
            .transpose()?
            .unwrap_or_default(),
    })
}

/// Validates the request, then stores the plan and its full schedule
/// atomically.
pub fn create_plan(conn: &Connection, title: &str, req: &PlanRequest) -> Result<i64> {
    if title.is_empty() {
        return Err(anyhow!("EMI title cannot be empty"));
    }
    let rows = schedule::generate(req)?;
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO emis(title, start_date, end_date, total_installments, installment_amount, cadence)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            title,
            req.start.to_string(),
            req.end.to_string(),
            rows.len() as i64,
            req.amount.to_string(),
            req.cadence.as_str()
        ],
    )?;
    let emi_id = tx.last_insert_rowid();
    {
        let mut stmt = tx.prepare(
            "INSERT INTO installments(emi_id, seq, due_date, amount, status)
             VALUES (?1, ?2, ?3, ?4, 'PENDING')",
        )?;
        for r in &rows {
            stmt.execute(params![
                emi_id,
                r.seq,
                r.due_date.to_string(),
                r.amount.to_string()
            ])?;
        }
    }
    tx.commit()?;
    tracing::info!(emi = emi_id, title, installments = rows.len(), "plan created");
    Ok(emi_id)
}

fn plan_from_row(r: &Row<'_>) -> Result<EmiPlan> {
    let start: String = r.get(2)?;
    let end: String = r.get(3)?;
    let count: i64 = r.get(4)?;
    let amount: String = r.get(5)?;
    let cadence: String = r.get(6)?;
    Ok(EmiPlan {
        id: r.get(0)?,
        title: r.get(1)?,
        start_date: stored_date(&start)?,
        end_date: stored_date(&end)?,
        total_installments: u32::try_from(count)
            .with_context(|| format!("Invalid installment count {} in database", count))?,
        installment_amount: stored_decimal(&amount, "installment amount")?,
        cadence: cadence.parse()?,
    })
}

const PLAN_COLUMNS: &str =
    "id, title, start_date, end_date, total_installments, installment_amount, cadence";

pub fn load_plan(conn: &Connection, id: i64) -> Result<EmiPlan> {
    let sql = format!("SELECT {} FROM emis WHERE id=?1", PLAN_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params![id])?;
    match rows.next()? {
        Some(r) => plan_from_row(r),
        None => Err(FinanceError::PlanNotFound(id).into()),
    }
}

pub fn all_plans(conn: &Connection) -> Result<Vec<EmiPlan>> {
    let sql = format!("SELECT {} FROM emis ORDER BY start_date, id", PLAN_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(plan_from_row(r)?);
    }
    Ok(out)
}

fn installment_from_row(r: &Row<'_>) -> Result<Installment> {
    let due: String = r.get(3)?;
    let amount: String = r.get(4)?;
    let status: String = r.get(5)?;
    let paid: Option<String> = r.get(6)?;
    Ok(Installment {
        id: r.get(0)?,
        emi_id: r.get(1)?,
        seq: r.get(2)?,
        due_date: stored_date(&due)?,
        amount: stored_decimal(&amount, "installment amount")?,
        status: InstallmentStatus::parse(&status)
            .with_context(|| format!("Invalid installment status '{}' in database", status))?,
        paid_date: paid.as_deref().map(stored_date).transpose()?,
    })
}

const INSTALLMENT_COLUMNS: &str = "id, emi_id, seq, due_date, amount, status, paid_date";

pub fn installments_for(conn: &Connection, emi_id: i64) -> Result<Vec<Installment>> {
    let sql = format!(
        "SELECT {} FROM installments WHERE emi_id=?1 ORDER BY due_date, seq",
        INSTALLMENT_COLUMNS
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let mut rows = stmt.query(params![emi_id])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(installment_from_row(r)?);
    }
    Ok(out)
}

pub fn load_installment(conn: &Connection, id: i64) -> Result<Installment> {
    let sql = format!("SELECT {} FROM installments WHERE id=?1", INSTALLMENT_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params![id])?;
    match rows.next()? {
        Some(r) => installment_from_row(r),
        None => Err(FinanceError::InstallmentNotFound(id).into()),
    }
}

/// PENDING -> PAID for exactly one installment; a second call fails and
/// leaves the row untouched.
pub fn mark_paid(conn: &Connection, installment_id: i64, paid_date: NaiveDate) -> Result<Installment> {
    let tx = conn.unchecked_transaction()?;
    let mut inst = load_installment(&tx, installment_id)?;
    schedule::mark_paid(&mut inst, paid_date)?;
    let n = tx.execute(
        "UPDATE installments SET status='PAID', paid_date=?1 WHERE id=?2 AND status='PENDING'",
        params![paid_date.to_string(), installment_id],
    )?;
    if n != 1 {
        return Err(FinanceError::AlreadyPaid(installment_id).into());
    }
    tx.commit()?;
    tracing::info!(installment = installment_id, emi = inst.emi_id, %paid_date, "installment paid");
    Ok(inst)
}

#[derive(Debug, Serialize)]
pub struct PlanView {
    #[serde(flatten)]
    pub plan: EmiPlan,
    pub total_amount: rust_decimal::Decimal,
    pub progress: Progress,
    pub next_due: Option<NaiveDate>,
    pub installments: Vec<Installment>,
}

pub fn plan_view(conn: &Connection, plan: EmiPlan) -> Result<PlanView> {
    let installments = installments_for(conn, plan.id)?;
    let progress = schedule::progress(&plan, &installments);
    let next_due = schedule::next_due(&installments).map(|i| i.due_date);
    Ok(PlanView {
        total_amount: plan.total_amount(),
        plan,
        progress,
        next_due,
        installments,
    })
}

pub fn plan_views(conn: &Connection) -> Result<Vec<PlanView>> {
    all_plans(conn)?
        .into_iter()
        .map(|p| plan_view(conn, p))
        .collect()
}

fn list_cmd(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = output_flags(sub);
    let views = plan_views(conn)?;
    if !maybe_print_json(json_flag, jsonl_flag, &views)? {
        let rows = views
            .iter()
            .map(|v| {
                vec![
                    v.plan.id.to_string(),
                    v.plan.title.clone(),
                    format!("{} to {}", v.plan.start_date, v.plan.end_date),
                    format!(
                        "{:.2} x {}",
                        v.plan.installment_amount, v.plan.total_installments
                    ),
                    format!("{}/{}", v.progress.paid_count, v.progress.total_count),
                    format!("{}%", v.progress.percent),
                    format!("{:.2}", v.progress.remaining_amount),
                    v.next_due.map(|d| d.to_string()).unwrap_or_default(),
                    v.progress.status.as_str().to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &[
                    "Id", "Title", "Period", "Installment", "Paid", "Progress", "Remaining",
                    "Next due", "Status"
                ],
                rows
            )
        );
    }
    Ok(())
}

fn show_cmd(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = output_flags(sub);
    let id = *sub.get_one::<i64>("id").unwrap();
    let view = plan_view(conn, load_plan(conn, id)?)?;
    if !maybe_print_json(json_flag, jsonl_flag, &view)? {
        println!(
            "{} ({}): {}% paid, {:.2} of {:.2} remaining",
            view.plan.title,
            view.progress.status.as_str(),
            view.progress.percent,
            view.progress.remaining_amount,
            view.progress.total_amount
        );
        let rows = view
            .installments
            .iter()
            .map(|i| {
                vec![
                    i.id.to_string(),
                    i.seq.to_string(),
                    i.due_date.to_string(),
                    format!("{:.2}", i.amount),
                    i.status.as_str().to_string(),
                    i.paid_date.map(|d| d.to_string()).unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Id", "#", "Due", "Amount", "Status", "Paid on"], rows)
        );
    }
    Ok(())
}

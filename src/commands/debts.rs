// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::errors::FinanceError;
use crate::models::{Debt, DebtStatus, DebtType, Settlement, check_money};
use crate::settlement::{self, DebtEdit, SettleOutcome};
use crate::utils::{
    fmt_timestamp, maybe_print_json, month_label, now, output_flags, parse_amount, parse_date,
    pretty_table, stored_date, stored_decimal, stored_timestamp,
};
use anyhow::{Result, anyhow};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{Connection, Row, params};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

const DEBT_COLUMNS: &str =
    "id, person_name, amount, type, status, amount_settled, due_date, created_at, closed_at";

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add_cmd(conn, sub)?,
        Some(("list", sub)) => list_cmd(conn, sub)?,
        Some(("pending", sub)) => pending_cmd(conn, sub)?,
        Some(("closed", sub)) => closed_cmd(conn, sub)?,
        Some(("settle", sub)) => settle_cmd(conn, sub)?,
        Some(("summary", sub)) => summary_cmd(conn, sub)?,
        Some(("persons", sub)) => {
            let (json_flag, jsonl_flag) = output_flags(sub);
            let names = persons(conn)?;
            if !maybe_print_json(json_flag, jsonl_flag, &names)? {
                let rows = names.into_iter().map(|n| vec![n]).collect();
                println!("{}", pretty_table(&["Person"], rows));
            }
        }
        Some(("show", sub)) => show_cmd(conn, sub)?,
        Some(("edit", sub)) => edit_cmd(conn, sub)?,
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let n = conn.execute("DELETE FROM debts WHERE id=?1", params![id])?;
            if n == 0 {
                return Err(FinanceError::DebtNotFound(id).into());
            }
            tracing::info!(debt = id, "debt removed");
            println!("Removed debt {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn debt_from_row(r: &Row<'_>) -> Result<Debt> {
    let amount: String = r.get(2)?;
    let kind: String = r.get(3)?;
    let status: String = r.get(4)?;
    let settled: String = r.get(5)?;
    let due: Option<String> = r.get(6)?;
    let created: String = r.get(7)?;
    let closed: Option<String> = r.get(8)?;
    Ok(Debt {
        id: r.get(0)?,
        person_name: r.get(1)?,
        amount: stored_decimal(&amount, "debt amount")?,
        r#type: kind.parse()?,
        status: status.parse()?,
        amount_settled: stored_decimal(&settled, "settled amount")?,
        due_date: due.as_deref().map(stored_date).transpose()?,
        created_at: stored_timestamp(&created)?,
        closed_at: closed.as_deref().map(stored_timestamp).transpose()?,
    })
}

pub fn create(
    conn: &Connection,
    person: &str,
    amount: Decimal,
    kind: DebtType,
    due: Option<NaiveDate>,
    at: NaiveDateTime,
) -> Result<i64> {
    let person = person.trim();
    if person.is_empty() {
        return Err(FinanceError::EmptyPersonName.into());
    }
    check_money(amount)?;
    conn.execute(
        "INSERT INTO debts(person_name, amount, type, status, amount_settled, due_date, created_at)
         VALUES (?1, ?2, ?3, 'PENDING', '0.00', ?4, ?5)",
        params![
            person,
            amount.to_string(),
            kind.as_str(),
            due.map(|d| d.to_string()),
            fmt_timestamp(&at)
        ],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(debt = id, person, %amount, kind = kind.as_str(), "debt created");
    Ok(id)
}

pub fn load(conn: &Connection, id: i64) -> Result<Debt> {
    let sql = format!("SELECT {} FROM debts WHERE id=?1", DEBT_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params![id])?;
    match rows.next()? {
        Some(r) => debt_from_row(r),
        None => Err(FinanceError::DebtNotFound(id).into()),
    }
}

fn save(conn: &Connection, debt: &Debt) -> Result<()> {
    conn.execute(
        "UPDATE debts SET person_name=?1, amount=?2, status=?3, amount_settled=?4,
                          due_date=?5, closed_at=?6
         WHERE id=?7",
        params![
            debt.person_name,
            debt.amount.to_string(),
            debt.status.as_str(),
            debt.amount_settled.to_string(),
            debt.due_date.map(|d| d.to_string()),
            debt.closed_at.as_ref().map(fmt_timestamp),
            debt.id
        ],
    )?;
    Ok(())
}

#[derive(Debug, Default, Clone)]
pub struct DebtFilter {
    pub person: Option<String>,
    pub status: Option<DebtStatus>,
}

fn query_debts(conn: &Connection, filter: &DebtFilter, order: &str) -> Result<Vec<Debt>> {
    let sql = format!(
        "SELECT {} FROM debts
         WHERE (?1 IS NULL OR instr(lower(person_name), lower(?1)) > 0)
           AND (?2 IS NULL OR status=?2)
         ORDER BY {}",
        DEBT_COLUMNS, order
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params![
        filter.person.as_deref(),
        filter.status.map(|s| s.as_str())
    ])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(debt_from_row(r)?);
    }
    Ok(out)
}

/// Pending debts first (most settled, then newest), then closed debts by
/// closing time, newest first.
pub fn list_debts(conn: &Connection, filter: &DebtFilter) -> Result<Vec<Debt>> {
    let mut pending = Vec::new();
    let mut closed = Vec::new();
    for debt in query_debts(conn, filter, "created_at DESC, id DESC")? {
        match debt.status {
            DebtStatus::Pending => pending.push(debt),
            DebtStatus::Closed => closed.push(debt),
        }
    }
    // stable sort keeps created_at DESC among equal settled amounts
    pending.sort_by(|a, b| b.amount_settled.cmp(&a.amount_settled));
    closed.sort_by(|a, b| b.closed_at.cmp(&a.closed_at));
    pending.extend(closed);
    Ok(pending)
}

#[derive(Debug, Serialize)]
pub struct DebtRow {
    pub id: i64,
    pub person_name: String,
    pub amount: Decimal,
    pub r#type: DebtType,
    pub status: DebtStatus,
    pub amount_settled: Decimal,
    pub outstanding_amount: Decimal,
    pub settled_percentage: Decimal,
    pub due_date: Option<NaiveDate>,
    pub created_at: String,
    pub closed_at: Option<String>,
    pub days_pending: Option<i64>,
}

impl DebtRow {
    pub fn from_debt(d: &Debt, now: NaiveDateTime) -> Self {
        DebtRow {
            id: d.id,
            person_name: d.person_name.clone(),
            amount: d.amount,
            r#type: d.r#type,
            status: d.status,
            amount_settled: d.amount_settled,
            outstanding_amount: d.outstanding(),
            settled_percentage: d.settled_percentage().round_dp(1),
            due_date: d.due_date,
            created_at: fmt_timestamp(&d.created_at),
            closed_at: d.closed_at.as_ref().map(fmt_timestamp),
            days_pending: d.days_pending(now),
        }
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.person_name.clone(),
            self.r#type.to_string(),
            self.status.to_string(),
            format!("{:.2}", self.amount),
            format!("{:.2}", self.amount_settled),
            format!("{:.2}", self.outstanding_amount),
            format!("{:.1}%", self.settled_percentage),
            self.due_date.map(|d| d.to_string()).unwrap_or_default(),
        ]
    }
}

const ROW_HEADERS: [&str; 9] = [
    "Id", "Person", "Type", "Status", "Amount", "Settled", "Outstanding", "Progress", "Due",
];

fn rows_for(debts: &[Debt]) -> Vec<DebtRow> {
    let now = now();
    debts.iter().map(|d| DebtRow::from_debt(d, now)).collect()
}

fn filter_from(sub: &clap::ArgMatches) -> Result<DebtFilter> {
    let person = sub
        .get_one::<String>("person")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let status = match sub.try_get_one::<String>("status") {
        Ok(Some(raw)) => Some(raw.parse::<DebtStatus>()?),
        _ => None,
    };
    Ok(DebtFilter { person, status })
}

fn add_cmd(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let person = sub.get_one::<String>("person").unwrap();
    let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
    let kind: DebtType = sub.get_one::<String>("type").unwrap().parse()?;
    let due = sub
        .get_one::<String>("due")
        .map(|s| parse_date(s))
        .transpose()?;
    let id = create(conn, person, amount, kind, due, now())?;
    println!("Recorded debt {} ({} {} {})", id, kind, amount, person.trim());
    Ok(())
}

fn list_cmd(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = output_flags(sub);
    let data = rows_for(&list_debts(conn, &filter_from(sub)?)?);
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows = data.iter().map(DebtRow::cells).collect();
        println!("{}", pretty_table(&ROW_HEADERS, rows));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct PendingView {
    pub count: usize,
    pub total_outstanding: Decimal,
    pub results: Vec<DebtRow>,
}

pub fn pending(conn: &Connection, person: Option<String>) -> Result<PendingView> {
    let filter = DebtFilter {
        person,
        status: Some(DebtStatus::Pending),
    };
    let mut debts = query_debts(conn, &filter, "created_at DESC, id DESC")?;
    debts.sort_by(|a, b| b.outstanding().cmp(&a.outstanding()));
    let total_outstanding = debts.iter().map(Debt::outstanding).sum();
    Ok(PendingView {
        count: debts.len(),
        total_outstanding,
        results: rows_for(&debts),
    })
}

fn pending_cmd(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = output_flags(sub);
    let view = pending(conn, filter_from(sub)?.person)?;
    if !maybe_print_json(json_flag, jsonl_flag, &view)? {
        let rows = view.results.iter().map(DebtRow::cells).collect();
        println!("{}", pretty_table(&ROW_HEADERS, rows));
        println!(
            "{} pending, {:.2} outstanding",
            view.count, view.total_outstanding
        );
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct MonthGroup {
    pub month: String,
    pub month_display: String,
    pub count: usize,
    pub debts: Vec<DebtRow>,
}

/// Closed debts bucketed by the month they closed in, newest month first.
pub fn closed_groups(conn: &Connection, person: Option<String>) -> Result<Vec<MonthGroup>> {
    let filter = DebtFilter {
        person,
        status: Some(DebtStatus::Closed),
    };
    let now = now();
    let mut groups: BTreeMap<String, Vec<DebtRow>> = BTreeMap::new();
    for debt in query_debts(conn, &filter, "closed_at DESC, id DESC")? {
        let Some(closed_at) = debt.closed_at else {
            tracing::warn!(debt = debt.id, "closed debt without closing time");
            continue;
        };
        groups
            .entry(closed_at.format("%Y-%m").to_string())
            .or_default()
            .push(DebtRow::from_debt(&debt, now));
    }
    Ok(groups
        .into_iter()
        .rev()
        .map(|(month, debts)| MonthGroup {
            month_display: month_label(&month),
            month,
            count: debts.len(),
            debts,
        })
        .collect())
}

fn closed_cmd(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = output_flags(sub);
    let groups = closed_groups(conn, filter_from(sub)?.person)?;
    if !maybe_print_json(json_flag, jsonl_flag, &groups)? {
        for g in &groups {
            println!("{} ({} closed)", g.month_display, g.count);
            let rows = g.debts.iter().map(DebtRow::cells).collect();
            println!("{}", pretty_table(&ROW_HEADERS, rows));
        }
    }
    Ok(())
}

/// Applies a settlement and appends it to the history in one transaction.
pub fn settle(
    conn: &Connection,
    id: i64,
    amount: Decimal,
    notes: &str,
    at: NaiveDateTime,
) -> Result<(Debt, SettleOutcome)> {
    let tx = conn.unchecked_transaction()?;
    let mut debt = load(&tx, id)?;
    let outcome = settlement::settle(&mut debt, amount, at)?;
    tx.execute(
        "INSERT INTO settlements(debt_id, amount, settled_at, notes) VALUES (?1, ?2, ?3, ?4)",
        params![id, amount.to_string(), fmt_timestamp(&at), notes],
    )?;
    save(&tx, &debt)?;
    tx.commit()?;
    tracing::info!(debt = id, %amount, outstanding = %debt.outstanding(), ?outcome, "settlement recorded");
    Ok((debt, outcome))
}

fn settle_cmd(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
    let notes = sub.get_one::<String>("notes").map(|s| s.trim()).unwrap_or("");
    let (debt, outcome) = settle(conn, id, amount, notes, now())?;
    match outcome {
        SettleOutcome::Closed => println!("Debt fully settled and closed"),
        SettleOutcome::Partial => println!(
            "Partial settlement recorded; {:.2} outstanding",
            debt.outstanding()
        ),
    }
    Ok(())
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct Breakdown {
    pub pending: Decimal,
    pub settled: Decimal,
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct DebtSummary {
    pub total_borrowed: Decimal,
    pub total_given: Decimal,
    pub total_outstanding: Decimal,
    pub total_settled: Decimal,
    pub borrowed_breakdown: Breakdown,
    pub given_breakdown: Breakdown,
}

pub fn summary(conn: &Connection, person: Option<String>) -> Result<DebtSummary> {
    let filter = DebtFilter {
        person,
        status: None,
    };
    let mut s = DebtSummary::default();
    for d in query_debts(conn, &filter, "id")? {
        s.total_settled += d.amount_settled;
        if d.status == DebtStatus::Pending {
            s.total_outstanding += d.outstanding();
        }
        let (total, breakdown) = match d.r#type {
            DebtType::Borrowed => (&mut s.total_borrowed, &mut s.borrowed_breakdown),
            DebtType::Given => (&mut s.total_given, &mut s.given_breakdown),
        };
        *total += d.amount;
        breakdown.settled += d.amount_settled;
        if d.status == DebtStatus::Pending {
            breakdown.pending += d.amount;
        }
    }
    Ok(s)
}

fn summary_cmd(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = output_flags(sub);
    let s = summary(conn, filter_from(sub)?.person)?;
    if !maybe_print_json(json_flag, jsonl_flag, &s)? {
        let rows = vec![
            vec!["Total borrowed".into(), format!("{:.2}", s.total_borrowed)],
            vec!["Total given".into(), format!("{:.2}", s.total_given)],
            vec!["Outstanding".into(), format!("{:.2}", s.total_outstanding)],
            vec!["Settled".into(), format!("{:.2}", s.total_settled)],
            vec![
                "Borrowed pending / settled".into(),
                format!(
                    "{:.2} / {:.2}",
                    s.borrowed_breakdown.pending, s.borrowed_breakdown.settled
                ),
            ],
            vec![
                "Given pending / settled".into(),
                format!(
                    "{:.2} / {:.2}",
                    s.given_breakdown.pending, s.given_breakdown.settled
                ),
            ],
        ];
        println!("{}", pretty_table(&["Metric", "Amount"], rows));
    }
    Ok(())
}

pub fn persons(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT DISTINCT person_name FROM debts ORDER BY person_name")?;
    let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn settlements_for(conn: &Connection, debt_id: i64) -> Result<Vec<Settlement>> {
    let mut stmt = conn.prepare(
        "SELECT id, amount, settled_at, notes FROM settlements
         WHERE debt_id=?1 ORDER BY settled_at DESC, id DESC",
    )?;
    let mut rows = stmt.query(params![debt_id])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let amount: String = r.get(1)?;
        let at: String = r.get(2)?;
        out.push(Settlement {
            id: r.get(0)?,
            debt_id,
            amount: stored_decimal(&amount, "settlement amount")?,
            settled_at: stored_timestamp(&at)?,
            notes: r.get(3)?,
        });
    }
    Ok(out)
}

#[derive(Debug, Serialize)]
struct DebtDetail {
    #[serde(flatten)]
    debt: DebtRow,
    settlements: Vec<Settlement>,
}

fn show_cmd(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = output_flags(sub);
    let id = *sub.get_one::<i64>("id").unwrap();
    let debt = load(conn, id)?;
    let detail = DebtDetail {
        debt: DebtRow::from_debt(&debt, now()),
        settlements: settlements_for(conn, id)?,
    };
    if !maybe_print_json(json_flag, jsonl_flag, &detail)? {
        println!("{}", pretty_table(&ROW_HEADERS, vec![detail.debt.cells()]));
        let rows = detail
            .settlements
            .iter()
            .map(|s| {
                vec![
                    fmt_timestamp(&s.settled_at),
                    format!("{:.2}", s.amount),
                    s.notes.clone(),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Settled at", "Amount", "Notes"], rows));
    }
    Ok(())
}

/// Edits a pending debt. Any attempt to change the type is rejected.
pub fn edit(
    conn: &Connection,
    id: i64,
    changes: DebtEdit,
    new_type: Option<DebtType>,
    at: NaiveDateTime,
) -> Result<Debt> {
    let mut debt = load(conn, id)?;
    if new_type.is_some_and(|t| t != debt.r#type) {
        return Err(anyhow!("Transaction type cannot be changed after creation"));
    }
    settlement::apply_edit(&mut debt, changes, at)?;
    save(conn, &debt)?;
    tracing::info!(debt = id, "debt edited");
    Ok(debt)
}

fn edit_cmd(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let changes = DebtEdit {
        person_name: sub.get_one::<String>("person").cloned(),
        amount: sub
            .get_one::<String>("amount")
            .map(|s| crate::utils::parse_decimal(s))
            .transpose()?,
        due_date: sub
            .get_one::<String>("due")
            .map(|s| parse_date(s))
            .transpose()?,
    };
    let new_type = sub
        .get_one::<String>("type")
        .map(|s| s.parse::<DebtType>())
        .transpose()?;
    let debt = edit(conn, id, changes, new_type, now())?;
    println!("Updated debt {} ({})", debt.id, debt.status);
    Ok(())
}

/// Sum of the recorded settlement history for a debt.
pub fn settled_from_history(conn: &Connection, debt_id: i64) -> Result<Decimal> {
    Ok(settlements_for(conn, debt_id)?.iter().map(|s| s.amount).sum())
}

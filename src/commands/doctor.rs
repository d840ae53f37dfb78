// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::{debts, emis};
use crate::models::{DebtStatus, InstallmentStatus};
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

/// Returns `(issue, detail)` pairs; empty when every invariant holds.
pub fn check(conn: &Connection) -> Result<Vec<(String, String)>> {
    let mut rows = Vec::new();

    // 1) EMI schedules
    for plan in emis::all_plans(conn)? {
        let installments = emis::installments_for(conn, plan.id)?;
        if installments.len() != plan.total_installments as usize {
            rows.push((
                "emi_count_mismatch".into(),
                format!(
                    "plan {}: {} rows, expected {}",
                    plan.id,
                    installments.len(),
                    plan.total_installments
                ),
            ));
        }
        let sum: Decimal = installments.iter().map(|i| i.amount).sum();
        if sum != plan.total_amount() {
            rows.push((
                "emi_sum_mismatch".into(),
                format!("plan {}: {} vs {}", plan.id, sum, plan.total_amount()),
            ));
        }
        if installments.windows(2).any(|w| w[0].due_date >= w[1].due_date) {
            rows.push((
                "emi_due_dates_not_increasing".into(),
                format!("plan {}", plan.id),
            ));
        }
        for i in &installments {
            let paid = i.status == InstallmentStatus::Paid;
            if paid != i.paid_date.is_some() {
                rows.push((
                    "installment_paid_date".into(),
                    format!("installment {} is {} with paid date {:?}", i.id, i.status.as_str(), i.paid_date),
                ));
            }
        }
    }

    // 2) Debt settlements
    let all = debts::list_debts(conn, &debts::DebtFilter::default())?;
    for d in &all {
        let history = debts::settled_from_history(conn, d.id)?;
        if history != d.amount_settled {
            rows.push((
                "debt_history_mismatch".into(),
                format!("debt {}: settled {} but history sums to {}", d.id, d.amount_settled, history),
            ));
        }
        if d.amount_settled > d.amount || d.amount_settled < Decimal::ZERO {
            rows.push((
                "debt_over_settled".into(),
                format!("debt {}: {} of {}", d.id, d.amount_settled, d.amount),
            ));
        }
        let should_close = d.outstanding().is_zero();
        if should_close != (d.status == DebtStatus::Closed) {
            rows.push((
                "debt_status_mismatch".into(),
                format!("debt {} is {} with {} outstanding", d.id, d.status, d.outstanding()),
            ));
        }
        if (d.status == DebtStatus::Closed) != d.closed_at.is_some() {
            rows.push((
                "debt_closed_at".into(),
                format!("debt {} is {} with closed_at {:?}", d.id, d.status, d.closed_at),
            ));
        }
    }

    Ok(rows)
}

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = check(conn)?;
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        tracing::warn!(issues = rows.len(), "doctor found inconsistencies");
        let data = rows.into_iter().map(|(a, b)| vec![a, b]).collect();
        println!("{}", pretty_table(&["Issue", "Detail"], data));
    }
    Ok(())
}

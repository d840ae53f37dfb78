// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! EMI schedule engine: installment generation, payment transitions and
//! plan-level progress. Pure functions over the models; persistence lives in
//! `commands::emis`.

use crate::errors::FinanceError;
use crate::models::{Cadence, EmiPlan, Installment, InstallmentStatus, check_money};
use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

/// Upper bound on installments per plan; a hundred years of monthly payments.
pub const MAX_INSTALLMENTS: u32 = 1200;

/// Validated input for a new plan.
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub count: i64,
    pub amount: Decimal,
    pub cadence: Cadence,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledInstallment {
    pub seq: u32,
    pub due_date: NaiveDate,
    pub amount: Decimal,
}

/// Derives the full installment list for a plan.
///
/// `Monthly` steps one calendar month from the previous due date, clamping to
/// the last day of shorter months. `Spread` places installment `i` at
/// `start + floor(i * span_days / (count - 1))`.
pub fn generate(req: &PlanRequest) -> Result<Vec<ScheduledInstallment>, FinanceError> {
    if req.start >= req.end {
        return Err(FinanceError::InvalidDateRange {
            start: req.start,
            end: req.end,
        });
    }
    if req.count < 1 {
        return Err(FinanceError::InvalidInstallmentCount(req.count));
    }
    if req.count > i64::from(MAX_INSTALLMENTS) {
        return Err(FinanceError::TooManyInstallments {
            count: req.count,
            max: MAX_INSTALLMENTS,
        });
    }
    let count = u32::try_from(req.count)
        .map_err(|_| FinanceError::InvalidInstallmentCount(req.count))?;
    check_money(req.amount)?;
    req.amount
        .checked_mul(Decimal::from(count))
        .ok_or(FinanceError::PlanTotalOverflow {
            amount: req.amount,
            count,
        })?;

    let dates = match req.cadence {
        Cadence::Monthly => monthly_dates(req.start, count)?,
        Cadence::Spread => spread_dates(req.start, req.end, count)?,
    };

    Ok(dates
        .into_iter()
        .enumerate()
        .map(|(i, due_date)| ScheduledInstallment {
            seq: i as u32 + 1,
            due_date,
            amount: req.amount,
        })
        .collect())
}

fn monthly_dates(start: NaiveDate, count: u32) -> Result<Vec<NaiveDate>, FinanceError> {
    let mut out = Vec::with_capacity(count as usize);
    let mut current = start;
    for _ in 0..count {
        out.push(current);
        current = current
            .checked_add_months(Months::new(1))
            .ok_or(FinanceError::DateOverflow(current))?;
    }
    Ok(out)
}

fn spread_dates(start: NaiveDate, end: NaiveDate, count: u32) -> Result<Vec<NaiveDate>, FinanceError> {
    if count == 1 {
        return Ok(vec![start]);
    }
    let span = (end - start).num_days();
    let steps = i64::from(count) - 1;
    if span < steps {
        return Err(FinanceError::ScheduleTooDense { start, end, count });
    }
    (0..i64::from(count))
        .map(|i| {
            let offset = (i * span / steps) as u64;
            start
                .checked_add_days(Days::new(offset))
                .ok_or(FinanceError::DateOverflow(start))
        })
        .collect()
}

/// Transitions one installment PENDING -> PAID. A paid installment is never
/// touched again.
pub fn mark_paid(inst: &mut Installment, paid_date: NaiveDate) -> Result<(), FinanceError> {
    if inst.status == InstallmentStatus::Paid {
        return Err(FinanceError::AlreadyPaid(inst.id));
    }
    inst.status = InstallmentStatus::Paid;
    inst.paid_date = Some(paid_date);
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlanStatus {
    Active,
    Completed,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Active => "ACTIVE",
            PlanStatus::Completed => "COMPLETED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progress {
    pub paid_count: u32,
    pub total_count: u32,
    pub percent: u32,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub remaining_amount: Decimal,
    pub status: PlanStatus,
}

pub fn progress(plan: &EmiPlan, installments: &[Installment]) -> Progress {
    let paid: Vec<&Installment> = installments
        .iter()
        .filter(|i| i.status == InstallmentStatus::Paid)
        .collect();
    let paid_count = paid.len() as u32;
    let total_count = installments.len() as u32;
    let paid_amount: Decimal = paid.iter().map(|i| i.amount).sum();
    let total_amount = plan.total_amount();
    let status = if total_count > 0 && paid_count == total_count {
        PlanStatus::Completed
    } else {
        PlanStatus::Active
    };
    Progress {
        paid_count,
        total_count,
        percent: round_percent(paid_count, total_count),
        total_amount,
        paid_amount,
        remaining_amount: total_amount - paid_amount,
        status,
    }
}

/// `round(100 * part / whole)`, halves rounded up; 0 for an empty whole.
pub fn round_percent(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    let (part, whole) = (u64::from(part), u64::from(whole));
    ((200 * part + whole) / (2 * whole)) as u32
}

pub fn next_due(installments: &[Installment]) -> Option<&Installment> {
    installments
        .iter()
        .filter(|i| i.status == InstallmentStatus::Pending)
        .min_by_key(|i| (i.due_date, i.seq))
}

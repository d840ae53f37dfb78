// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Debt settlement rules. Persistence lives in `commands::debts`.

use crate::errors::FinanceError;
use crate::models::{Debt, DebtStatus, check_money};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleOutcome {
    Partial,
    Closed,
}

/// Checks a proposed settlement against the debt without mutating it.
pub fn validate_settlement(debt: &Debt, amount: Decimal) -> Result<(), FinanceError> {
    if debt.status == DebtStatus::Closed {
        return Err(FinanceError::DebtClosed);
    }
    check_money(amount)?;
    let outstanding = debt.outstanding();
    if amount > outstanding {
        return Err(FinanceError::ExceedsOutstanding {
            amount,
            outstanding,
        });
    }
    Ok(())
}

/// Applies a settlement; closes the debt when nothing is left outstanding.
pub fn settle(debt: &mut Debt, amount: Decimal, at: NaiveDateTime) -> Result<SettleOutcome, FinanceError> {
    validate_settlement(debt, amount)?;
    debt.amount_settled += amount;
    if debt.outstanding().is_zero() {
        debt.status = DebtStatus::Closed;
        debt.closed_at = Some(at);
        Ok(SettleOutcome::Closed)
    } else {
        Ok(SettleOutcome::Partial)
    }
}

/// Field-level edits allowed on a pending debt. The type is fixed at creation.
#[derive(Debug, Clone, Default)]
pub struct DebtEdit {
    pub person_name: Option<String>,
    pub amount: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
}

/// Lowering the amount to exactly what was settled closes the debt.
pub fn apply_edit(debt: &mut Debt, edit: DebtEdit, at: NaiveDateTime) -> Result<(), FinanceError> {
    if debt.status == DebtStatus::Closed {
        return Err(FinanceError::ClosedDebtImmutable);
    }
    if let Some(name) = edit.person_name {
        let name = name.trim();
        if name.is_empty() {
            return Err(FinanceError::EmptyPersonName);
        }
        debt.person_name = name.to_string();
    }
    if let Some(amount) = edit.amount {
        check_money(amount)?;
        if amount < debt.amount_settled {
            return Err(FinanceError::BelowSettled {
                amount,
                settled: debt.amount_settled,
            });
        }
        debt.amount = amount;
        if debt.outstanding().is_zero() {
            debt.status = DebtStatus::Closed;
            debt.closed_at = Some(at);
        }
    }
    if let Some(due) = edit.due_date {
        debt.due_date = Some(due);
    }
    Ok(())
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::errors::FinanceError;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Decimal places kept for every money column.
pub const MONEY_SCALE: u32 = 2;

/// Largest money value a column holds: 99,999,999.99.
pub const MAX_MONEY: Decimal = Decimal::from_parts(0x540B_E3FF, 0x2, 0, false, MONEY_SCALE);

/// Rejects amounts that are not positive, carry more than two decimal places,
/// or exceed [`MAX_MONEY`].
pub fn check_money(amount: Decimal) -> Result<(), FinanceError> {
    if amount <= Decimal::ZERO {
        return Err(FinanceError::NonPositiveAmount(amount));
    }
    if amount.normalize().scale() > MONEY_SCALE {
        return Err(FinanceError::TooManyDecimalPlaces(amount));
    }
    if amount > MAX_MONEY {
        return Err(FinanceError::AmountTooLarge {
            amount,
            max: MAX_MONEY,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseLine {
    pub id: i64,
    pub date: NaiveDate,
    pub item: String,
    pub category: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DebtType {
    Borrowed,
    Given,
}

impl DebtType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DebtType::Borrowed => "BORROWED",
            DebtType::Given => "GIVEN",
        }
    }
}

impl FromStr for DebtType {
    type Err = FinanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BORROWED" => Ok(DebtType::Borrowed),
            "GIVEN" => Ok(DebtType::Given),
            _ => Err(FinanceError::UnknownDebtType(s.trim().to_string())),
        }
    }
}

impl fmt::Display for DebtType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DebtStatus {
    Pending,
    Closed,
}

impl DebtStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DebtStatus::Pending => "PENDING",
            DebtStatus::Closed => "CLOSED",
        }
    }
}

impl FromStr for DebtStatus {
    type Err = FinanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(DebtStatus::Pending),
            "CLOSED" => Ok(DebtStatus::Closed),
            _ => Err(FinanceError::UnknownDebtStatus(s.trim().to_string())),
        }
    }
}

impl fmt::Display for DebtStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debt {
    pub id: i64,
    pub person_name: String,
    pub amount: Decimal,
    pub r#type: DebtType,
    pub status: DebtStatus,
    pub amount_settled: Decimal,
    pub due_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub closed_at: Option<NaiveDateTime>,
}

impl Debt {
    pub fn outstanding(&self) -> Decimal {
        self.amount - self.amount_settled
    }

    /// Share of the principal already settled, in percent.
    pub fn settled_percentage(&self) -> Decimal {
        if self.amount.is_zero() {
            return Decimal::ZERO;
        }
        self.amount_settled / self.amount * Decimal::ONE_HUNDRED
    }

    /// Whole days since creation; `None` once the debt is closed.
    pub fn days_pending(&self, now: NaiveDateTime) -> Option<i64> {
        match self.status {
            DebtStatus::Pending => Some((now - self.created_at).num_days()),
            DebtStatus::Closed => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    pub id: i64,
    pub debt_id: i64,
    pub amount: Decimal,
    pub settled_at: NaiveDateTime,
    pub notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    /// One calendar month apart starting on the start date.
    #[default]
    Monthly,
    /// Linearly interpolated by day offset across the start..=end span.
    Spread,
}

impl Cadence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cadence::Monthly => "monthly",
            Cadence::Spread => "spread",
        }
    }
}

impl FromStr for Cadence {
    type Err = FinanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(Cadence::Monthly),
            "spread" => Ok(Cadence::Spread),
            _ => Err(FinanceError::UnknownCadence(s.trim().to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmiPlan {
    pub id: i64,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_installments: u32,
    pub installment_amount: Decimal,
    pub cadence: Cadence,
}

impl EmiPlan {
    /// Saturates rather than panicking on rows written outside `schedule::generate`.
    pub fn total_amount(&self) -> Decimal {
        self.installment_amount
            .saturating_mul(Decimal::from(self.total_installments))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InstallmentStatus {
    Pending,
    Paid,
}

impl InstallmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstallmentStatus::Pending => "PENDING",
            InstallmentStatus::Paid => "PAID",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(InstallmentStatus::Pending),
            "PAID" => Some(InstallmentStatus::Paid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Installment {
    pub id: i64,
    pub emi_id: i64,
    pub seq: u32,
    pub due_date: NaiveDate,
    pub amount: Decimal,
    pub status: InstallmentStatus,
    pub paid_date: Option<NaiveDate>,
}

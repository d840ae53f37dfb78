// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Validation and state-transition failures raised by the schedule and
/// settlement engines. Nothing is written when one of these is returned.
#[derive(Debug, Error, PartialEq)]
pub enum FinanceError {
    #[error("Start date {start} must be before end date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Installment count must be at least 1 (got {0})")]
    InvalidInstallmentCount(i64),

    #[error("Amount must be positive (got {0})")]
    NonPositiveAmount(Decimal),

    #[error("Amount {amount} exceeds the maximum of {max}")]
    AmountTooLarge { amount: Decimal, max: Decimal },

    #[error("Amount {0} has more than two decimal places")]
    TooManyDecimalPlaces(Decimal),

    #[error("Installment count {count} exceeds the maximum of {max}")]
    TooManyInstallments { count: i64, max: u32 },

    #[error("Plan total overflows for {count} installments of {amount}")]
    PlanTotalOverflow { amount: Decimal, count: u32 },

    #[error("{count} installments do not fit between {start} and {end} with distinct due dates")]
    ScheduleTooDense {
        start: NaiveDate,
        end: NaiveDate,
        count: u32,
    },

    #[error("Due date overflow after {0}")]
    DateOverflow(NaiveDate),

    #[error("Unknown cadence '{0}' (use monthly|spread)")]
    UnknownCadence(String),

    #[error("Installment {0} not found")]
    InstallmentNotFound(i64),

    #[error("Installment {0} is already paid")]
    AlreadyPaid(i64),

    #[error("EMI plan {0} not found")]
    PlanNotFound(i64),

    #[error("Debt {0} not found")]
    DebtNotFound(i64),

    #[error("Cannot settle a closed debt")]
    DebtClosed,

    #[error("Closed debts cannot be modified")]
    ClosedDebtImmutable,

    #[error("Settlement amount exceeds outstanding balance of {outstanding}")]
    ExceedsOutstanding {
        amount: Decimal,
        outstanding: Decimal,
    },

    #[error("Amount {amount} cannot be less than the {settled} already settled")]
    BelowSettled { amount: Decimal, settled: Decimal },

    #[error("Person name cannot be empty")]
    EmptyPersonName,

    #[error("Unknown debt type '{0}' (use borrowed|given)")]
    UnknownDebtType(String),

    #[error("Unknown debt status '{0}' (use pending|closed)")]
    UnknownDebtStatus(String),
}

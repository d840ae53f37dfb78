// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, NaiveDateTime};
use pocketbook::errors::FinanceError;
use pocketbook::models::{Debt, DebtStatus, DebtType, MAX_MONEY};
use pocketbook::settlement::{self, DebtEdit, SettleOutcome};
use rust_decimal::Decimal;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn debt(amount: &str) -> Debt {
    Debt {
        id: 1,
        person_name: "Asha".into(),
        amount: dec(amount),
        r#type: DebtType::Borrowed,
        status: DebtStatus::Pending,
        amount_settled: Decimal::ZERO,
        due_date: None,
        created_at: ts("2025-01-01 09:00:00"),
        closed_at: None,
    }
}

#[test]
fn partial_then_full_settlement_closes_once() {
    let mut d = debt("500");
    let at = ts("2025-02-01 10:00:00");

    let first = settlement::settle(&mut d, dec("300"), at).unwrap();
    assert_eq!(first, SettleOutcome::Partial);
    assert_eq!(d.outstanding(), dec("200"));
    assert_eq!(d.status, DebtStatus::Pending);
    assert!(d.closed_at.is_none());

    let second = settlement::settle(&mut d, dec("200"), at).unwrap();
    assert_eq!(second, SettleOutcome::Closed);
    assert_eq!(d.outstanding(), Decimal::ZERO);
    assert_eq!(d.status, DebtStatus::Closed);
    assert_eq!(d.closed_at, Some(at));
}

#[test]
fn over_settlement_is_rejected_without_mutation() {
    let mut d = debt("500");
    settlement::settle(&mut d, dec("300"), ts("2025-02-01 10:00:00")).unwrap();
    let err = settlement::settle(&mut d, dec("200.01"), ts("2025-02-02 10:00:00")).unwrap_err();
    assert_eq!(
        err,
        FinanceError::ExceedsOutstanding {
            amount: dec("200.01"),
            outstanding: dec("200")
        }
    );
    assert_eq!(
        err.to_string(),
        "Settlement amount exceeds outstanding balance of 200"
    );
    assert_eq!(d.amount_settled, dec("300"));
}

#[test]
fn closed_or_non_positive_settlements_are_rejected() {
    let mut d = debt("100");
    assert_eq!(
        settlement::settle(&mut d, Decimal::ZERO, ts("2025-02-01 10:00:00")),
        Err(FinanceError::NonPositiveAmount(Decimal::ZERO))
    );
    settlement::settle(&mut d, dec("100"), ts("2025-02-01 10:00:00")).unwrap();
    assert_eq!(
        settlement::validate_settlement(&d, dec("1")),
        Err(FinanceError::DebtClosed)
    );
}

#[test]
fn edits_respect_settled_amount_and_auto_close() {
    let mut d = debt("500");
    let at = ts("2025-03-01 08:00:00");
    settlement::settle(&mut d, dec("200"), at).unwrap();

    let below = DebtEdit {
        amount: Some(dec("150")),
        ..Default::default()
    };
    assert!(matches!(
        settlement::apply_edit(&mut d, below, at),
        Err(FinanceError::BelowSettled { .. })
    ));

    let rename = DebtEdit {
        person_name: Some("  Asha K ".into()),
        due_date: NaiveDate::from_ymd_opt(2025, 6, 1),
        ..Default::default()
    };
    settlement::apply_edit(&mut d, rename, at).unwrap();
    assert_eq!(d.person_name, "Asha K");
    assert_eq!(d.due_date, NaiveDate::from_ymd_opt(2025, 6, 1));

    let exact = DebtEdit {
        amount: Some(dec("200")),
        ..Default::default()
    };
    settlement::apply_edit(&mut d, exact, at).unwrap();
    assert_eq!(d.status, DebtStatus::Closed);
    assert_eq!(d.closed_at, Some(at));

    let late = DebtEdit {
        person_name: Some("Someone".into()),
        ..Default::default()
    };
    assert_eq!(
        settlement::apply_edit(&mut d, late, at),
        Err(FinanceError::ClosedDebtImmutable)
    );
}

#[test]
fn edits_and_settlements_keep_money_bounds() {
    let mut d = debt("500");
    let at = ts("2025-03-01 08:00:00");
    let huge = DebtEdit {
        amount: Some(dec("100000000")),
        ..Default::default()
    };
    assert!(matches!(
        settlement::apply_edit(&mut d, huge, at),
        Err(FinanceError::AmountTooLarge { max, .. }) if max == MAX_MONEY
    ));
    let fine = DebtEdit {
        amount: Some(dec("99.999")),
        ..Default::default()
    };
    assert_eq!(
        settlement::apply_edit(&mut d, fine, at),
        Err(FinanceError::TooManyDecimalPlaces(dec("99.999")))
    );
    assert_eq!(d.amount, dec("500"));

    assert_eq!(
        settlement::settle(&mut d, dec("0.001"), at),
        Err(FinanceError::TooManyDecimalPlaces(dec("0.001")))
    );
    assert_eq!(d.amount_settled, Decimal::ZERO);
}

#[test]
fn settled_percentage_and_days_pending() {
    let mut d = debt("400");
    settlement::settle(&mut d, dec("100"), ts("2025-01-05 00:00:00")).unwrap();
    assert_eq!(d.settled_percentage(), dec("25"));
    assert_eq!(d.days_pending(ts("2025-01-11 09:00:00")), Some(10));
    settlement::settle(&mut d, dec("300"), ts("2025-01-12 00:00:00")).unwrap();
    assert_eq!(d.days_pending(ts("2025-01-20 09:00:00")), None);
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pocketbook::api::client::join_url;
use pocketbook::api::session::session_path;
use pocketbook::api::types::{Listing, RemoteDebtSummary, RemoteEmi, RemoteMonthTotal, SettleResponse};
use pocketbook::api::{ApiClient, ApiError, Session, extract_error_message};
use pocketbook::commands::remote::authed_client;
use pocketbook::config::{self, FileConfig};
use pocketbook::models::{DebtStatus, InstallmentStatus};
use rust_decimal::Decimal;
use tempfile::tempdir;

#[test]
fn error_message_prefers_known_keys() {
    assert_eq!(
        extract_error_message(r#"{"error": "Cannot settle a closed debt"}"#),
        "Cannot settle a closed debt"
    );
    assert_eq!(
        extract_error_message(r#"{"detail": "Given token not valid", "message": "x"}"#),
        "Given token not valid"
    );
    assert_eq!(extract_error_message(r#"{"message": "nope"}"#), "nope");
    assert_eq!(
        extract_error_message(r#"{"username": ["A user with that username already exists."]}"#),
        "username: A user with that username already exists."
    );
    assert_eq!(
        extract_error_message(r#"["Closed debts cannot be modified"]"#),
        "Closed debts cannot be modified"
    );
    assert_eq!(extract_error_message("<h1>Server Error</h1>"), "<h1>Server Error</h1>");
}

#[test]
fn urls_join_with_or_without_trailing_slash() {
    assert_eq!(
        join_url("http://localhost:8000/api", "emis/").unwrap().as_str(),
        "http://localhost:8000/api/emis/"
    );
    assert_eq!(
        join_url("http://localhost:8000/api/", "/debts/7/settle/").unwrap().as_str(),
        "http://localhost:8000/api/debts/7/settle/"
    );
    assert!(matches!(join_url("  ", "emis/"), Err(ApiError::MissingBaseUrl)));
    assert!(matches!(join_url("not a url", "emis/"), Err(ApiError::InvalidUrl(_))));
}

#[test]
fn session_round_trips_through_data_dir() {
    let dir = tempdir().unwrap();
    let path = session_path(dir.path());
    assert_eq!(Session::load(&path).unwrap(), None);

    let s = Session {
        access: "a.b.c".into(),
        refresh: "r.s.t".into(),
        base_url: Some("http://localhost:8000/api/".into()),
    };
    s.save(&path).unwrap();
    assert_eq!(Session::load(&path).unwrap(), Some(s));

    assert!(Session::clear(&path).unwrap());
    assert!(!Session::clear(&path).unwrap());
    assert_eq!(Session::load(&path).unwrap(), None);
}

#[test]
fn remote_calls_fail_before_sending_without_session() {
    let client = ApiClient::new("http://127.0.0.1:9/api/", None).unwrap();
    assert!(matches!(client.list_emis(), Err(ApiError::NotLoggedIn)));
    assert!(matches!(
        client.settle_debt(1, Decimal::ONE, ""),
        Err(ApiError::NotLoggedIn)
    ));

    let dir = tempdir().unwrap();
    let cfg = config::resolve(FileConfig::default(), dir.path().to_path_buf(), |_| None);
    assert!(matches!(authed_client(&cfg), Err(ApiError::NotLoggedIn)));
}

#[test]
fn decodes_money_as_strings_or_numbers() {
    let emis: Listing<RemoteEmi> = serde_json::from_str(
        r#"{"results": [{
            "id": 3, "title": "Phone", "start_date": "2025-01-01", "end_date": "2025-12-01",
            "total_months": 12, "monthly_amount": "1000.00", "progress": 25.0,
            "installments": [
                {"id": 10, "due_date": "2025-01-01", "amount": 1000, "status": "PAID", "paid_date": "2025-01-02"},
                {"id": 11, "due_date": "2025-02-01", "amount": "1000.00", "status": "PENDING", "paid_date": null}
            ]
        }]}"#,
    )
    .unwrap();
    let emis = emis.into_vec();
    assert_eq!(emis[0].monthly_amount, Decimal::from(1000));
    assert_eq!(emis[0].progress, Some(Decimal::from(25)));
    assert_eq!(emis[0].installments[0].status, InstallmentStatus::Paid);
    assert_eq!(emis[0].installments[1].paid_date, None);

    let summary: RemoteDebtSummary = serde_json::from_str(
        r#"{"total_borrowed": 500.0, "total_given": 200.5, "total_outstanding": 400.0,
            "total_settled": 300.0,
            "borrowed_breakdown": {"pending": 500.0, "settled": 100.0},
            "given_breakdown": {"pending": 0.0, "settled": 200.0}}"#,
    )
    .unwrap();
    assert_eq!(summary.total_given, "200.5".parse::<Decimal>().unwrap());

    let settled: SettleResponse = serde_json::from_str(
        r#"{"message": "Debt fully settled and closed", "debt": {
            "id": 4, "person_name": "Ravi", "amount": "500.00", "type": "GIVEN",
            "status": "CLOSED", "amount_settled": "500.00", "outstanding_amount": "0.00",
            "due_date": null, "settlements": []}}"#,
    )
    .unwrap();
    assert_eq!(settled.debt.status, DebtStatus::Closed);
    assert_eq!(settled.debt.outstanding_amount, Some(Decimal::ZERO));

    let months: Vec<RemoteMonthTotal> =
        serde_json::from_str(r#"[{"month": "January", "month_num": 1, "total": 1250.50}]"#).unwrap();
    assert_eq!(months[0].total, "1250.5".parse::<Decimal>().unwrap());
}

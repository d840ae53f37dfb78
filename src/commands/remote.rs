// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::api::session::session_path;
use crate::api::{ApiClient, ApiError, Session};
use crate::commands::auth::resolve_base_url;
use crate::config::AppConfig;
use crate::utils::{fmt_money, maybe_print_json, output_flags, parse_amount, pretty_table, today};
use anyhow::Result;
use chrono::Datelike;

/// Client carrying the stored session; fails before any request when
/// nobody is logged in.
pub fn authed_client(cfg: &AppConfig) -> Result<ApiClient, ApiError> {
    let session = Session::load(&session_path(&cfg.data_dir))?.ok_or(ApiError::NotLoggedIn)?;
    let url = resolve_base_url(None, cfg, Some(&session))?;
    ApiClient::new(&url, Some(session))
}

pub fn handle(cfg: &AppConfig, m: &clap::ArgMatches) -> Result<()> {
    let client = authed_client(cfg)?;
    let ccy = cfg.currency.as_str();
    match m.subcommand() {
        Some(("emis", sub)) => {
            let (json_flag, jsonl_flag) = output_flags(sub);
            let emis = client.list_emis()?;
            if !maybe_print_json(json_flag, jsonl_flag, &emis)? {
                let rows = emis
                    .iter()
                    .map(|e| {
                        let paid = e
                            .installments
                            .iter()
                            .filter(|i| i.status == crate::models::InstallmentStatus::Paid)
                            .count();
                        vec![
                            e.id.to_string(),
                            e.title.clone(),
                            format!("{} to {}", e.start_date, e.end_date),
                            format!("{:.2} x {}", e.monthly_amount, e.total_months),
                            format!("{}/{}", paid, e.installments.len()),
                            e.progress
                                .map(|p| format!("{}%", p.round_dp(2)))
                                .unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Id", "Title", "Period", "Installment", "Paid", "Progress"], rows)
                );
            }
        }
        Some(("pay", sub)) => {
            let id = *sub.get_one::<i64>("installment").unwrap();
            let inst = client.mark_installment_paid(id)?;
            println!(
                "Installment {} due {} is now {}",
                inst.id,
                inst.due_date,
                inst.status.as_str()
            );
        }
        Some(("settle", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
            let notes = sub.get_one::<String>("notes").map(String::as_str).unwrap_or("");
            let res = client.settle_debt(id, amount, notes)?;
            let outstanding = res
                .debt
                .outstanding_amount
                .unwrap_or(res.debt.amount - res.debt.amount_settled);
            println!(
                "{}: {} now {} with {} outstanding",
                res.message,
                res.debt.person_name,
                res.debt.status,
                fmt_money(&outstanding, ccy)
            );
        }
        Some(("debt-summary", sub)) => {
            let (json_flag, jsonl_flag) = output_flags(sub);
            let person = sub.get_one::<String>("person").map(|s| s.trim());
            let s = client.debt_summary(person)?;
            if !maybe_print_json(json_flag, jsonl_flag, &s)? {
                let rows = vec![
                    vec!["Borrowed".into(), fmt_money(&s.total_borrowed, ccy)],
                    vec!["Given".into(), fmt_money(&s.total_given, ccy)],
                    vec!["Outstanding".into(), fmt_money(&s.total_outstanding, ccy)],
                    vec!["Settled".into(), fmt_money(&s.total_settled, ccy)],
                ];
                println!("{}", pretty_table(&["", ""], rows));
            }
        }
        Some(("monthly", sub)) => {
            let (json_flag, jsonl_flag) = output_flags(sub);
            let year = sub
                .get_one::<i32>("year")
                .copied()
                .unwrap_or_else(|| today().year());
            let data = client.monthly_bar_chart(year)?;
            if !maybe_print_json(json_flag, jsonl_flag, &data)? {
                let rows = data
                    .iter()
                    .map(|m| vec![m.month.clone(), format!("{:.2}", m.total)])
                    .collect();
                println!("{}", pretty_table(&["Month", "Total"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}

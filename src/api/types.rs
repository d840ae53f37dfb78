// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{DebtStatus, DebtType, InstallmentStatus};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// Money arrives either as a decimal string ("12.50") or a JSON number.
pub fn lenient_decimal<'de, D>(d: D) -> std::result::Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }
    let text = match Raw::deserialize(d)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    };
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|_| serde::de::Error::custom(format!("invalid decimal '{}'", text)))
}

fn lenient_decimal_opt<'de, D>(d: D) -> std::result::Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrap(#[serde(deserialize_with = "lenient_decimal")] Decimal);
    Ok(Option::<Wrap>::deserialize(d)?.map(|w| w.0))
}

/// A bare list or a paginated `{"results": [...]}` envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Plain(Vec<T>),
    Paged { results: Vec<T> },
}

impl<T> Listing<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Plain(v) | Listing::Paged { results: v } => v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteInstallment {
    pub id: i64,
    pub due_date: NaiveDate,
    #[serde(deserialize_with = "lenient_decimal")]
    pub amount: Decimal,
    pub status: InstallmentStatus,
    #[serde(default)]
    pub paid_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteEmi {
    pub id: i64,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_months: u32,
    #[serde(deserialize_with = "lenient_decimal")]
    pub monthly_amount: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal_opt")]
    pub progress: Option<Decimal>,
    #[serde(default)]
    pub installments: Vec<RemoteInstallment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteDebt {
    pub id: i64,
    pub person_name: String,
    #[serde(deserialize_with = "lenient_decimal")]
    pub amount: Decimal,
    pub r#type: DebtType,
    pub status: DebtStatus,
    #[serde(deserialize_with = "lenient_decimal")]
    pub amount_settled: Decimal,
    #[serde(default, deserialize_with = "lenient_decimal_opt")]
    pub outstanding_amount: Option<Decimal>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettleResponse {
    pub message: String,
    pub debt: RemoteDebt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteBreakdown {
    #[serde(deserialize_with = "lenient_decimal")]
    pub pending: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub settled: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteDebtSummary {
    #[serde(deserialize_with = "lenient_decimal")]
    pub total_borrowed: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub total_given: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub total_outstanding: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub total_settled: Decimal,
    pub borrowed_breakdown: RemoteBreakdown,
    pub given_breakdown: RemoteBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteMonthTotal {
    pub month: String,
    pub month_num: u32,
    #[serde(deserialize_with = "lenient_decimal")]
    pub total: Decimal,
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::types::{
    Listing, RemoteDebtSummary, RemoteEmi, RemoteInstallment, RemoteMonthTotal, SettleResponse,
    TokenPair,
};
use super::{ApiError, Result, Session, extract_error_message};
use crate::utils::http_client;
use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder, Response};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::json;

pub struct ApiClient {
    http: Client,
    base: Url,
    session: Option<Session>,
}

/// Joins `path` onto `base`, treating the base as a directory whether or
/// not it ends in a slash.
pub fn join_url(base: &str, path: &str) -> Result<Url> {
    let base = base.trim();
    if base.is_empty() {
        return Err(ApiError::MissingBaseUrl);
    }
    let dir = if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{}/", base)
    };
    let root = Url::parse(&dir).map_err(|_| ApiError::InvalidUrl(base.to_string()))?;
    root.join(path.trim_start_matches('/'))
        .map_err(|_| ApiError::InvalidUrl(format!("{}{}", dir, path)))
}

impl ApiClient {
    pub fn new(base_url: &str, session: Option<Session>) -> Result<Self> {
        let base = join_url(base_url, "")?;
        let http = http_client()?;
        Ok(Self {
            http,
            base,
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    fn url(&self, path: &str) -> Result<Url> {
        join_url(self.base.as_str(), path)
    }

    fn bearer(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        let session = self.session.as_ref().ok_or(ApiError::NotLoggedIn)?;
        Ok(req.bearer_auth(&session.access))
    }

    fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
        let status = resp.status();
        let body = resp.text()?;
        if !status.is_success() {
            return Err(ApiError::Server {
                status: status.as_u16(),
                message: extract_error_message(&body),
            });
        }
        Ok(serde_json::from_str(&body)?)
    }

    pub fn login(&self, username: &str, password: &str) -> Result<Session> {
        let resp = self
            .http
            .post(self.url("auth/login/")?)
            .json(&json!({ "username": username, "password": password }))
            .send()?;
        let tokens: TokenPair = Self::decode(resp)?;
        tracing::info!(username, server = %self.base, "logged in");
        Ok(Session {
            access: tokens.access,
            refresh: tokens.refresh,
            base_url: Some(self.base.to_string()),
        })
    }

    pub fn register(&self, username: &str, email: &str, password: &str) -> Result<()> {
        let resp = self
            .http
            .post(self.url("auth/register/")?)
            .json(&json!({ "username": username, "email": email, "password": password }))
            .send()?;
        let _: serde_json::Value = Self::decode(resp)?;
        tracing::info!(username, server = %self.base, "registered");
        Ok(())
    }

    pub fn list_emis(&self) -> Result<Vec<RemoteEmi>> {
        let req = self.bearer(self.http.get(self.url("emis/")?))?;
        let listing: Listing<RemoteEmi> = Self::decode(req.send()?)?;
        Ok(listing.into_vec())
    }

    pub fn mark_installment_paid(&self, installment_id: i64) -> Result<RemoteInstallment> {
        let url = self.url(&format!("installments/{}/mark_paid/", installment_id))?;
        let req = self.bearer(self.http.post(url))?;
        Self::decode(req.send()?)
    }

    pub fn settle_debt(&self, debt_id: i64, amount: Decimal, notes: &str) -> Result<SettleResponse> {
        let url = self.url(&format!("debts/{}/settle/", debt_id))?;
        let req = self
            .bearer(self.http.post(url))?
            .json(&json!({ "amount": amount.to_string(), "notes": notes }));
        Self::decode(req.send()?)
    }

    pub fn debt_summary(&self, person: Option<&str>) -> Result<RemoteDebtSummary> {
        let mut req = self.bearer(self.http.get(self.url("debts/summary/")?))?;
        if let Some(p) = person {
            req = req.query(&[("person", p)]);
        }
        Self::decode(req.send()?)
    }

    pub fn monthly_bar_chart(&self, year: i32) -> Result<Vec<RemoteMonthTotal>> {
        let req = self
            .bearer(self.http.get(self.url("daily-expenses/monthly_bar_chart/")?))?
            .query(&[("year", year)]);
        Self::decode(req.send()?)
    }
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::api::session::session_path;
use crate::api::{ApiClient, ApiError, Session};
use crate::config::AppConfig;
use anyhow::Result;

/// Picks the server: explicit `--url`, then configuration, then the server
/// the stored session was issued by.
pub fn resolve_base_url(
    explicit: Option<&str>,
    cfg: &AppConfig,
    session: Option<&Session>,
) -> Result<String, ApiError> {
    explicit
        .map(str::to_string)
        .or_else(|| cfg.api_base_url.clone())
        .or_else(|| session.and_then(|s| s.base_url.clone()))
        .filter(|u| !u.trim().is_empty())
        .ok_or(ApiError::MissingBaseUrl)
}

pub fn handle(cfg: &AppConfig, m: &clap::ArgMatches) -> Result<()> {
    let path = session_path(&cfg.data_dir);
    match m.subcommand() {
        Some(("login", sub)) => {
            let username = sub.get_one::<String>("username").unwrap().trim();
            let password = sub.get_one::<String>("password").unwrap();
            let url = resolve_base_url(sub.get_one::<String>("url").map(String::as_str), cfg, None)?;
            let client = ApiClient::new(&url, None)?;
            let session = client.login(username, password)?;
            session.save(&path)?;
            println!("Logged in as {} at {}", username, client.base_url());
        }
        Some(("register", sub)) => {
            let username = sub.get_one::<String>("username").unwrap().trim();
            let email = sub.get_one::<String>("email").unwrap().trim();
            let password = sub.get_one::<String>("password").unwrap();
            let url = resolve_base_url(sub.get_one::<String>("url").map(String::as_str), cfg, None)?;
            let client = ApiClient::new(&url, None)?;
            client.register(username, email, password)?;
            println!("Registered {}; run `pocketbook auth login` next", username);
        }
        Some(("logout", _)) => {
            if Session::clear(&path)? {
                tracing::info!("session cleared");
                println!("Logged out");
            } else {
                println!("Not logged in");
            }
        }
        Some(("status", _)) => match Session::load(&path)? {
            Some(s) => println!(
                "Logged in ({})",
                s.base_url.as_deref().unwrap_or("server unknown")
            ),
            None => println!("Not logged in"),
        },
        _ => {}
    }
    Ok(())
}

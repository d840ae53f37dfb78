// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Blocking client for the hosted finance server plus the persisted login
//! session it authenticates with.

pub mod client;
pub mod session;
pub mod types;

pub use client::ApiClient;
pub use session::Session;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not logged in; run `pocketbook auth login` first")]
    NotLoggedIn,

    #[error("No server configured; set api_base_url or POCKETBOOK_API_URL")]
    MissingBaseUrl,

    #[error("Invalid server URL '{0}'")]
    InvalidUrl(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Pulls a single human-readable message out of an error body. Looks at
/// `error`, `detail` and `message`, then the first field error, and falls
/// back to the raw body.
pub fn extract_error_message(body: &str) -> String {
    let raw = body.trim();
    let Ok(value) = serde_json::from_str::<serde_json::Value>(raw) else {
        return raw.to_string();
    };
    if let Some(obj) = value.as_object() {
        for key in ["error", "detail", "message"] {
            if let Some(msg) = obj.get(key).and_then(first_text) {
                return msg;
            }
        }
        for (field, v) in obj {
            if let Some(msg) = first_text(v) {
                return format!("{}: {}", field, msg);
            }
        }
    }
    if let Some(msg) = first_text(&value) {
        return msg;
    }
    raw.to_string()
}

// a string, or the first string inside a list
fn first_text(v: &serde_json::Value) -> Option<String> {
    match v {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => items.iter().find_map(first_text),
        _ => None,
    }
}

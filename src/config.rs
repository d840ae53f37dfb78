// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Pocketbook", "pocketbook"));

pub const DEFAULT_CURRENCY: &str = "INR";
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Settings read from `config.toml`; every key is optional.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
pub struct FileConfig {
    pub database_path: Option<PathBuf>,
    pub api_base_url: Option<String>,
    pub currency: Option<String>,
    pub log_filter: Option<String>,
}

/// Fully resolved configuration after env overrides and defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub data_dir: PathBuf,
    pub api_base_url: Option<String>,
    pub currency: String,
    pub log_filter: String,
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")
}

pub fn data_dir() -> Result<PathBuf> {
    let proj = project_dirs()?;
    let dir = proj.data_dir();
    fs::create_dir_all(dir).context("Failed to create data dir")?;
    Ok(dir.to_path_buf())
}

pub fn config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.toml"))
}

pub fn parse_config(contents: &str) -> Result<FileConfig> {
    toml::from_str(contents).context("Failed to parse config TOML")
}

pub fn load_file_config<P: AsRef<Path>>(path: P) -> Result<FileConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::debug!("No config file at {}", path.display());
        return Ok(FileConfig::default());
    }
    tracing::debug!("Loading configuration from {}", path.display());
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("In config file {}", path.display()))
}

/// Merges file values, environment overrides and defaults.
/// `env` is injected so tests do not depend on the process environment.
pub fn resolve<F>(file: FileConfig, data_dir: PathBuf, env: F) -> AppConfig
where
    F: Fn(&str) -> Option<String>,
{
    let database_path = env("POCKETBOOK_DB")
        .map(PathBuf::from)
        .or(file.database_path)
        .unwrap_or_else(|| data_dir.join("pocketbook.sqlite"));
    let api_base_url = env("POCKETBOOK_API_URL").or(file.api_base_url);
    let currency = env("POCKETBOOK_CURRENCY")
        .or(file.currency)
        .map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
    let log_filter = env("RUST_LOG")
        .or(file.log_filter)
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
    AppConfig {
        database_path,
        data_dir,
        api_base_url,
        currency,
        log_filter,
    }
}

pub fn load() -> Result<AppConfig> {
    let file = load_file_config(config_path()?)?;
    let cfg = resolve(file, data_dir()?, |k| std::env::var(k).ok());
    tracing::debug!(db = %cfg.database_path.display(), "Resolved configuration");
    Ok(cfg)
}

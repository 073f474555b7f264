// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod fs;
pub mod logging;

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::CliArgs;
use crate::config::loader::{load_and_validate, redacted};
use crate::config::{RfwConfig, SettingValue};
use crate::fs::RealFileSystem;

/// High-level entry point used by `main.rs`.
///
/// Loads the config, runs the startup validation pass and optionally prints
/// the validated settings. Any error means the service must not start.
pub fn run(args: CliArgs) -> Result<()> {
    let config = load_and_validate(Arc::new(RealFileSystem), &args.config)?;
    info!(config = %args.config.display(), "configuration ok");

    if args.dump {
        print!("{}", dump_toml(&config)?);
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct ConfigDump {
    whitelist: Vec<String>,
    settings: toml::Table,
}

/// Render every applicable setting and the whitelist as TOML.
///
/// Keys come from the rule table, in its order; `auth.password` is masked.
pub fn dump_toml(config: &RfwConfig) -> Result<String> {
    let mut settings = toml::Table::new();
    for setting in config.settings()? {
        let key = setting.key.as_str();
        let value = match &setting.value {
            SettingValue::Flag(b) => toml::Value::Boolean(*b),
            other => toml::Value::String(redacted(key, other)),
        };
        settings.insert(key.to_string(), value);
    }

    let dump = ConfigDump {
        whitelist: config.whitelist()?.to_vec(),
        settings,
    };
    toml::to_string(&dump).context("serializing config dump")
}

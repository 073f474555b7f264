// src/config/loader.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::rfw::{RfwConfig, Setting, SettingValue};
use crate::config::rules::RULES;
use crate::errors::Result;
use crate::fs::FileSystem;

/// Startup validation pass.
///
/// Walks [`RULES`] in dependency order and resolves every key that applies
/// under the current flags, then loads (and caches) the whitelist. The first
/// violation is returned; nothing is validated lazily after this succeeds.
///
/// This is the only intended writer of the whitelist cache, and it runs
/// before the config is shared with anything else.
pub fn bootstrap(config: &RfwConfig) -> Result<Vec<Setting>> {
    let mut settings = Vec::with_capacity(RULES.len());

    for rule in RULES.iter() {
        if !config.is_applicable(rule.key)? {
            debug!(key = %rule.key, reason = rule.when.unmet_reason(), "skipping");
            continue;
        }

        let value = config.resolve(rule.key)?;
        if let (Some(note), SettingValue::Flag(false)) = (rule.disabled_note, &value) {
            info!("{note}");
        }
        debug!(key = %rule.key, value = %redacted(rule.key.as_str(), &value), "validated");

        settings.push(Setting {
            key: rule.key,
            value,
        });
    }

    let whitelist = config.whitelist()?;
    info!(
        keys = settings.len(),
        whitelist_entries = whitelist.len(),
        "configuration validated"
    );

    Ok(settings)
}

/// Load a config file from path and run the startup validation pass.
///
/// This is the recommended entry point for the rest of the application.
pub fn load_and_validate(fs: Arc<dyn FileSystem>, path: impl AsRef<Path>) -> Result<RfwConfig> {
    let path = path.as_ref();
    info!(path = ?path, "loading configuration");
    RfwConfig::load_with(fs, path)
}

/// Default config location: `rfw.conf` in the working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("rfw.conf")
}

/// Hide secrets from logs and dumps.
pub fn redacted(key: &str, value: &SettingValue) -> String {
    if key == "auth.password" {
        "********".to_string()
    } else {
        value.to_string()
    }
}

// src/config/rfw.rs

//! Validated, read-only view over the firewall config.
//!
//! Every accessor goes through the same three steps: check the key's
//! [`Condition`] against the current flags, look the value up, run the
//! key's [`Check`]. An unmet condition is a contract violation
//! ([`RfwConfigError::NotEnabled`]) even when the key is present.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::config::loader::bootstrap;
use crate::config::rules::{Check, Condition, Key, RULES};
use crate::config::source::RawConfig;
use crate::config::validate::{validate_chain_action, validate_port, ChainAction};
use crate::config::whitelist::load_whitelist;
use crate::errors::{Result, RfwConfigError};
use crate::fs::{FileSystem, RealFileSystem};

const PORT_FORMAT: &str = "It should be a single number from the 1..65535 range";

/// A resolved setting value, as produced by [`RfwConfig::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    Flag(bool),
    Text(String),
    Path(PathBuf),
    Action(ChainAction),
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Flag(b) => write!(f, "{b}"),
            SettingValue::Text(s) => f.write_str(s),
            SettingValue::Path(p) => write!(f, "{}", p.display()),
            SettingValue::Action(a) => f.write_str(a.as_str()),
        }
    }
}

/// One applicable key together with its validated value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting {
    pub key: Key,
    pub value: SettingValue,
}

#[derive(Debug)]
pub struct RfwConfig {
    raw: RawConfig,
    fs: Arc<dyn FileSystem>,
    /// Written once, during bootstrap or the first `whitelist()` call.
    whitelist: OnceLock<Vec<String>>,
}

impl RfwConfig {
    /// Load `path` from disk and run the startup validation pass.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(Arc::new(RealFileSystem), path)
    }

    pub fn load_with(fs: Arc<dyn FileSystem>, path: impl AsRef<Path>) -> Result<Self> {
        let raw = RawConfig::load(fs.as_ref(), path)?;
        Self::from_raw(raw, fs)
    }

    /// Wrap an already parsed config and run the startup validation pass.
    pub fn from_raw(raw: RawConfig, fs: Arc<dyn FileSystem>) -> Result<Self> {
        let config = Self::new_unchecked(raw, fs);
        bootstrap(&config)?;
        Ok(config)
    }

    /// Wrap a parsed config without validating anything up front.
    ///
    /// Errors then surface on first access instead of at construction.
    pub fn new_unchecked(raw: RawConfig, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            raw,
            fs,
            whitelist: OnceLock::new(),
        }
    }

    fn condition_holds(&self, condition: Condition) -> Result<bool> {
        Ok(match condition {
            Condition::Always => true,
            Condition::OutwardServer => self.raw.get_flag(Key::OutwardServer.as_str())?,
            Condition::LocalServer => self.raw.get_flag(Key::LocalServer.as_str())?,
            Condition::AuthRequired => {
                self.raw.get_flag(Key::OutwardServer.as_str())?
                    || (self.raw.get_flag(Key::LocalServer.as_str())?
                        && self.raw.get_flag(Key::LocalServerAuthentication.as_str())?)
            }
        })
    }

    /// Whether `key` may be read under the current flags.
    pub fn is_applicable(&self, key: Key) -> Result<bool> {
        self.condition_holds(key.rule().when)
    }

    fn ensure_applicable(&self, key: Key) -> Result<()> {
        let condition = key.rule().when;
        if self.condition_holds(condition)? {
            Ok(())
        } else {
            Err(RfwConfigError::NotEnabled {
                key: key.as_str().to_string(),
                condition: condition.unmet_reason().to_string(),
            })
        }
    }

    fn flag(&self, key: Key) -> Result<bool> {
        self.ensure_applicable(key)?;
        self.raw.get_flag(key.as_str())
    }

    fn port(&self, key: Key) -> Result<String> {
        self.ensure_applicable(key)?;
        let value = self.raw.require(key.as_str())?;
        validate_port(value).ok_or_else(|| RfwConfigError::InvalidValue {
            key: key.as_str().to_string(),
            reason: PORT_FORMAT.to_string(),
        })
    }

    fn text(&self, key: Key) -> Result<String> {
        self.ensure_applicable(key)?;
        Ok(self.raw.require(key.as_str())?.to_string())
    }

    fn non_empty(&self, key: Key) -> Result<String> {
        let value = self.text(key)?;
        if value.is_empty() {
            return Err(RfwConfigError::InvalidValue {
                key: key.as_str().to_string(),
                reason: "It cannot be empty".to_string(),
            });
        }
        Ok(value)
    }

    fn file(&self, key: Key) -> Result<PathBuf> {
        self.ensure_applicable(key)?;
        self.raw.get_file(self.fs.as_ref(), key.as_str())
    }

    fn chain_action(&self, key: Key) -> Result<ChainAction> {
        self.ensure_applicable(key)?;
        let value = self.raw.require(key.as_str())?;
        if value.is_empty() {
            return Err(RfwConfigError::InvalidValue {
                key: key.as_str().to_string(),
                reason: "It cannot be empty. Allowed values are DROP or ACCEPT".to_string(),
            });
        }
        validate_chain_action(value).ok_or_else(|| RfwConfigError::InvalidValue {
            key: key.as_str().to_string(),
            reason: "Allowed values are DROP or ACCEPT".to_string(),
        })
    }

    /// Resolve `key` according to its rule.
    pub fn resolve(&self, key: Key) -> Result<SettingValue> {
        Ok(match key.rule().check {
            Check::Flag => SettingValue::Flag(self.flag(key)?),
            Check::Port => SettingValue::Text(self.port(key)?),
            Check::Raw => SettingValue::Text(self.text(key)?),
            Check::NonEmpty => SettingValue::Text(self.non_empty(key)?),
            Check::File => SettingValue::Path(self.file(key)?),
            Check::ChainAction => SettingValue::Action(self.chain_action(key)?),
        })
    }

    /// Every applicable key with its value, in rule-table order.
    pub fn settings(&self) -> Result<Vec<Setting>> {
        let mut settings = Vec::new();
        for rule in RULES.iter() {
            if !self.is_applicable(rule.key)? {
                continue;
            }
            let value = self.resolve(rule.key)?;
            settings.push(Setting {
                key: rule.key,
                value,
            });
        }
        Ok(settings)
    }

    pub fn is_outward_server(&self) -> Result<bool> {
        self.flag(Key::OutwardServer)
    }

    pub fn outward_server_port(&self) -> Result<String> {
        self.port(Key::OutwardServerPort)
    }

    pub fn outward_server_ip(&self) -> Result<String> {
        self.text(Key::OutwardServerIp)
    }

    pub fn outward_server_certfile(&self) -> Result<PathBuf> {
        self.file(Key::OutwardServerCertfile)
    }

    pub fn outward_server_keyfile(&self) -> Result<PathBuf> {
        self.file(Key::OutwardServerKeyfile)
    }

    pub fn is_local_server(&self) -> Result<bool> {
        self.flag(Key::LocalServer)
    }

    pub fn local_server_port(&self) -> Result<String> {
        self.port(Key::LocalServerPort)
    }

    pub fn is_local_server_authentication(&self) -> Result<bool> {
        self.flag(Key::LocalServerAuthentication)
    }

    pub fn is_non_restful(&self) -> Result<bool> {
        self.flag(Key::NonRestful)
    }

    pub fn auth_username(&self) -> Result<String> {
        self.non_empty(Key::AuthUsername)
    }

    pub fn auth_password(&self) -> Result<String> {
        self.non_empty(Key::AuthPassword)
    }

    pub fn chain_input_action(&self) -> Result<ChainAction> {
        self.chain_action(Key::ChainInputAction)
    }

    pub fn chain_output_action(&self) -> Result<ChainAction> {
        self.chain_action(Key::ChainOutputAction)
    }

    pub fn chain_forward_action(&self) -> Result<ChainAction> {
        self.chain_action(Key::ChainForwardAction)
    }

    pub fn whitelist_file(&self) -> Result<PathBuf> {
        self.file(Key::WhitelistFile)
    }

    /// Validated whitelist entries, read from disk at most once.
    pub fn whitelist(&self) -> Result<&[String]> {
        if let Some(entries) = self.whitelist.get() {
            return Ok(entries);
        }
        let file = self.whitelist_file()?;
        let entries = load_whitelist(self.fs.as_ref(), &file)?;
        debug!(file = ?file, entries = entries.len(), "whitelist cached");
        // A racing initializer may have won; either result is identical.
        Ok(self.whitelist.get_or_init(|| entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn fs_with_whitelist() -> Arc<MockFileSystem> {
        let fs = MockFileSystem::new();
        fs.add_file("/wl", "10.0.0.0/8\n");
        Arc::new(fs)
    }

    fn minimal_pairs() -> Vec<(&'static str, &'static str)> {
        vec![
            ("chain.input.action", "drop"),
            ("chain.output.action", "ACCEPT"),
            ("chain.forward.action", "Drop"),
            ("whitelist.file", "/wl"),
        ]
    }

    fn unchecked(extra: &[(&'static str, &'static str)]) -> RfwConfig {
        let mut pairs = minimal_pairs();
        pairs.extend_from_slice(extra);
        RfwConfig::new_unchecked(RawConfig::from_pairs(pairs), fs_with_whitelist())
    }

    #[test]
    fn port_read_while_outward_disabled_is_contract_violation() {
        let config = unchecked(&[("outward.server", "false"), ("outward.server.port", "443")]);
        match config.outward_server_port() {
            Err(RfwConfigError::NotEnabled { key, condition }) => {
                assert_eq!(key, "outward.server.port");
                assert_eq!(condition, "outward.server not enabled");
            }
            other => panic!("expected NotEnabled, got {other:?}"),
        }
    }

    #[test]
    fn missing_port_when_enabled_names_the_key() {
        let config = unchecked(&[("local.server", "true")]);
        match config.local_server_port() {
            Err(RfwConfigError::MissingKey { key }) => assert_eq!(key, "local.server.port"),
            other => panic!("expected MissingKey, got {other:?}"),
        }
    }

    #[test]
    fn bad_port_states_expected_format() {
        let config = unchecked(&[("local.server", "true"), ("local.server.port", "70000")]);
        let err = config.local_server_port().unwrap_err();
        assert!(err.to_string().contains("1..65535"));
    }

    #[test]
    fn auth_applicability_follows_flags() {
        let off = unchecked(&[("auth.username", "admin")]);
        assert!(!off.is_applicable(Key::AuthUsername).unwrap());
        assert!(matches!(
            off.auth_username(),
            Err(RfwConfigError::NotEnabled { .. })
        ));

        let local_auth = unchecked(&[
            ("local.server", "true"),
            ("local.server.authentication", "true"),
            ("auth.username", "admin"),
        ]);
        assert_eq!(local_auth.auth_username().unwrap(), "admin");

        // local.server.authentication alone does nothing with local.server off
        let stray = unchecked(&[("local.server.authentication", "true")]);
        assert!(!stray.is_applicable(Key::AuthPassword).unwrap());
    }

    #[test]
    fn empty_credentials_are_invalid() {
        let config = unchecked(&[("outward.server", "yes"), ("auth.password", "")]);
        match config.auth_password() {
            Err(RfwConfigError::InvalidValue { key, reason }) => {
                assert_eq!(key, "auth.password");
                assert_eq!(reason, "It cannot be empty");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn chain_actions_are_canonicalized() {
        let config = unchecked(&[]);
        assert_eq!(config.chain_input_action().unwrap(), ChainAction::Drop);
        assert_eq!(config.chain_output_action().unwrap(), ChainAction::Accept);
        assert_eq!(config.chain_forward_action().unwrap().as_str(), "DROP");
    }

    #[test]
    fn chain_action_errors_distinguish_empty_and_wrong() {
        let mut pairs = minimal_pairs();
        pairs[0] = ("chain.input.action", "");
        pairs[1] = ("chain.output.action", "REJECT");
        let config = RfwConfig::new_unchecked(RawConfig::from_pairs(pairs), fs_with_whitelist());

        let empty = config.chain_input_action().unwrap_err().to_string();
        let wrong = config.chain_output_action().unwrap_err().to_string();
        assert_eq!(
            empty,
            "Wrong chain.input.action value. It cannot be empty. Allowed values are DROP or ACCEPT"
        );
        assert_eq!(
            wrong,
            "Wrong chain.output.action value. Allowed values are DROP or ACCEPT"
        );
    }

    #[test]
    fn settings_skip_inapplicable_keys() {
        let config = unchecked(&[("outward.server.port", "443")]);
        let keys: Vec<Key> = config.settings().unwrap().iter().map(|s| s.key).collect();
        assert_eq!(
            keys,
            vec![
                Key::OutwardServer,
                Key::LocalServer,
                Key::NonRestful,
                Key::ChainInputAction,
                Key::ChainOutputAction,
                Key::ChainForwardAction,
                Key::WhitelistFile,
            ]
        );
    }

    #[test]
    fn whitelist_is_read_once() {
        let fs = fs_with_whitelist();
        let config =
            RfwConfig::new_unchecked(RawConfig::from_pairs(minimal_pairs()), fs.clone());

        let first = config.whitelist().unwrap().to_vec();
        let second = config.whitelist().unwrap();
        assert_eq!(first, second);
        assert_eq!(fs.read_count("/wl"), 1);
    }
}

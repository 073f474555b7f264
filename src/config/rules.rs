// src/config/rules.rs

//! Declarative dependency rules for every config key.
//!
//! Each [`Rule`] binds a [`Key`] to the [`Condition`] under which it may be
//! read and the [`Check`] applied to its value. [`RULES`] lists them in
//! dependency order: a key's condition only refers to keys listed before it.
//! Both the public accessors and the startup sequencer consume this table.

use std::fmt;

/// Every key of the config namespace.
///
/// Declared in [`RULES`] order, so a key's discriminant is its row index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    OutwardServer,
    OutwardServerPort,
    OutwardServerIp,
    OutwardServerCertfile,
    OutwardServerKeyfile,
    LocalServer,
    LocalServerPort,
    LocalServerAuthentication,
    NonRestful,
    AuthUsername,
    AuthPassword,
    ChainInputAction,
    ChainOutputAction,
    ChainForwardAction,
    WhitelistFile,
}

impl Key {
    pub fn as_str(self) -> &'static str {
        match self {
            Key::OutwardServer => "outward.server",
            Key::OutwardServerPort => "outward.server.port",
            Key::OutwardServerIp => "outward.server.ip",
            Key::OutwardServerCertfile => "outward.server.certfile",
            Key::OutwardServerKeyfile => "outward.server.keyfile",
            Key::LocalServer => "local.server",
            Key::LocalServerPort => "local.server.port",
            Key::LocalServerAuthentication => "local.server.authentication",
            Key::NonRestful => "non.restful",
            Key::AuthUsername => "auth.username",
            Key::AuthPassword => "auth.password",
            Key::ChainInputAction => "chain.input.action",
            Key::ChainOutputAction => "chain.output.action",
            Key::ChainForwardAction => "chain.forward.action",
            Key::WhitelistFile => "whitelist.file",
        }
    }

    /// The rule governing this key.
    pub fn rule(self) -> &'static Rule {
        &RULES[self as usize]
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When a key may be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Always,
    /// `outward.server` is true.
    OutwardServer,
    /// `local.server` is true.
    LocalServer,
    /// `outward.server` is true, or both `local.server` and
    /// `local.server.authentication` are true.
    AuthRequired,
}

impl Condition {
    /// Why the condition is unmet, phrased to follow "`<key>` read while".
    pub fn unmet_reason(self) -> &'static str {
        match self {
            Condition::Always => "always applicable",
            Condition::OutwardServer => "outward.server not enabled",
            Condition::LocalServer => "local.server not enabled",
            Condition::AuthRequired => {
                "outward.server not enabled and local.server.authentication not enabled"
            }
        }
    }
}

/// How a key's value is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// Boolean flag; absent means false.
    Flag,
    /// Mandatory port number.
    Port,
    /// Mandatory value, passed through unvalidated.
    Raw,
    /// Mandatory path to an existing file.
    File,
    /// Mandatory non-empty string.
    NonEmpty,
    /// Mandatory `DROP` / `ACCEPT`.
    ChainAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub key: Key,
    pub when: Condition,
    pub check: Check,
    /// Informational note logged at startup when this flag is off.
    pub disabled_note: Option<&'static str>,
}

const fn rule(key: Key, when: Condition, check: Check) -> Rule {
    Rule {
        key,
        when,
        check,
        disabled_note: None,
    }
}

pub const RULES: [Rule; 15] = [
    Rule {
        key: Key::OutwardServer,
        when: Condition::Always,
        check: Check::Flag,
        disabled_note: Some(
            "outward.server not enabled. Ignoring outward.server.port and outward.server.ip if present.",
        ),
    },
    rule(Key::OutwardServerPort, Condition::OutwardServer, Check::Port),
    rule(Key::OutwardServerIp, Condition::OutwardServer, Check::Raw),
    rule(Key::OutwardServerCertfile, Condition::OutwardServer, Check::File),
    rule(Key::OutwardServerKeyfile, Condition::OutwardServer, Check::File),
    Rule {
        key: Key::LocalServer,
        when: Condition::Always,
        check: Check::Flag,
        disabled_note: Some("local.server not enabled. Ignoring local.server.port if present."),
    },
    rule(Key::LocalServerPort, Condition::LocalServer, Check::Port),
    rule(Key::LocalServerAuthentication, Condition::LocalServer, Check::Flag),
    rule(Key::NonRestful, Condition::Always, Check::Flag),
    rule(Key::AuthUsername, Condition::AuthRequired, Check::NonEmpty),
    rule(Key::AuthPassword, Condition::AuthRequired, Check::NonEmpty),
    rule(Key::ChainInputAction, Condition::Always, Check::ChainAction),
    rule(Key::ChainOutputAction, Condition::Always, Check::ChainAction),
    rule(Key::ChainForwardAction, Condition::Always, Check::ChainAction),
    rule(Key::WhitelistFile, Condition::Always, Check::File),
];

/// Keys a condition depends on; used to check the table ordering.
pub fn condition_inputs(condition: Condition) -> &'static [Key] {
    match condition {
        Condition::Always => &[],
        Condition::OutwardServer => &[Key::OutwardServer],
        Condition::LocalServer => &[Key::LocalServer],
        Condition::AuthRequired => &[
            Key::OutwardServer,
            Key::LocalServer,
            Key::LocalServerAuthentication,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_key_has_exactly_one_rule() {
        let keys: HashSet<Key> = RULES.iter().map(|r| r.key).collect();
        assert_eq!(keys.len(), RULES.len());
    }

    #[test]
    fn rows_are_indexed_by_key() {
        for (idx, rule) in RULES.iter().enumerate() {
            assert_eq!(rule.key as usize, idx, "{} is out of place", rule.key);
            assert_eq!(rule.key.rule().key, rule.key);
        }
    }

    #[test]
    fn conditions_only_refer_to_earlier_flags() {
        for (idx, rule) in RULES.iter().enumerate() {
            for input in condition_inputs(rule.when) {
                let pos = RULES
                    .iter()
                    .position(|r| r.key == *input)
                    .expect("condition input has a rule");
                assert!(pos < idx, "{} depends on later key {}", rule.key, input);
                assert_eq!(RULES[pos].check, Check::Flag, "{input} must be a flag");
            }
        }
    }

    #[test]
    fn only_server_flags_carry_disabled_notes() {
        let noted: Vec<Key> = RULES
            .iter()
            .filter(|r| r.disabled_note.is_some())
            .map(|r| r.key)
            .collect();
        assert_eq!(noted, vec![Key::OutwardServer, Key::LocalServer]);
    }

    #[test]
    fn key_lookup_roundtrips() {
        assert_eq!(Key::AuthPassword.rule().when, Condition::AuthRequired);
        assert_eq!(Key::OutwardServerIp.rule().check, Check::Raw);
        assert_eq!(Key::ChainForwardAction.to_string(), "chain.forward.action");
    }
}

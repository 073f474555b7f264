// src/config/mod.rs

//! Firewall configuration loading and validation.
//!
//! Responsibilities:
//! - Read the flat `key = value` config file (`source.rs`).
//! - Validate single values: ports, IPs, CIDR ranges, chain actions (`validate.rs`).
//! - Declare which keys apply under which flags (`rules.rs`).
//! - Expose one accessor per setting (`rfw.rs`).
//! - Load and cache the IP whitelist (`whitelist.rs`).
//! - Force every applicable rule once at startup (`loader.rs`).

pub mod loader;
pub mod rfw;
pub mod rules;
pub mod source;
pub mod validate;
pub mod whitelist;

pub use loader::{bootstrap, default_config_path, load_and_validate};
pub use rfw::{RfwConfig, Setting, SettingValue};
pub use rules::{Check, Condition, Key, Rule, RULES};
pub use source::RawConfig;
pub use validate::{
    validate_chain_action, validate_ip, validate_ip_cidr, validate_port, ChainAction,
};
pub use whitelist::{load_whitelist, parse_whitelist};

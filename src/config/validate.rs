// src/config/validate.rs

//! Primitive value validators.
//!
//! Validators never fail with an error: they return the accepted (trimmed)
//! value or `None`. Turning `None` into a descriptive startup error is the job
//! of [`crate::config::RfwConfig`], which knows the key being read.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

static IP_CIDR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{1,3})\.([0-9]{1,3})\.([0-9]{1,3})\.([0-9]{1,3})(?:/([0-9]{1,2}))?$")
        .expect("IP/CIDR pattern is valid")
});

/// Default disposition of a packet-filtering chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainAction {
    Drop,
    Accept,
}

impl ChainAction {
    /// Canonical upper-case spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            ChainAction::Drop => "DROP",
            ChainAction::Accept => "ACCEPT",
        }
    }
}

impl fmt::Display for ChainAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChainAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DROP" => Ok(ChainAction::Drop),
            "ACCEPT" => Ok(ChainAction::Accept),
            other => Err(format!(
                "invalid chain action: {other} (expected \"DROP\" or \"ACCEPT\")"
            )),
        }
    }
}

/// Port number in `1..=65535`, returned as the trimmed original string.
pub fn validate_port(port: &str) -> Option<String> {
    let port = port.trim();
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match port.parse::<u32>() {
        Ok(n) if (1..=65535).contains(&n) => Some(port.to_string()),
        _ => None,
    }
}

/// IPv4 address with an optional `/N` mask, e.g. `192.168.1.0/24`.
///
/// Each octet must be below 256 and a mask, when present, within `0..=32`.
/// A bare address is accepted only with `allow_no_mask`. The trimmed input is
/// returned as-is, not normalized.
pub fn validate_ip_cidr(ip: &str, allow_no_mask: bool) -> Option<String> {
    let ip = ip.trim();
    let caps = IP_CIDR_RE.captures(ip)?;

    for octet in 1..=4usize {
        let value: u16 = caps[octet].parse().ok()?;
        if value > 255 {
            return None;
        }
    }

    match caps.get(5) {
        Some(mask) => {
            let mask: u8 = mask.as_str().parse().ok()?;
            (mask <= 32).then(|| ip.to_string())
        }
        None => allow_no_mask.then(|| ip.to_string()),
    }
}

/// Bare IPv4 address; any mask suffix is rejected.
pub fn validate_ip(ip: &str) -> Option<String> {
    validate_ip_cidr(ip, true).filter(|ip| !ip.contains('/'))
}

/// `DROP` or `ACCEPT`, case-insensitive.
pub fn validate_chain_action(action: &str) -> Option<ChainAction> {
    if action.is_empty() {
        return None;
    }
    action.parse().ok()
}

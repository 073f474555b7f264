// src/config/whitelist.rs

//! Whitelist file parsing.
//!
//! One IPv4 address or CIDR range per line; blank lines and lines starting
//! with `#` are skipped. Entries keep file order and are neither deduplicated
//! nor merged.

use std::path::Path;

use crate::config::validate::validate_ip_cidr;
use crate::errors::{Result, RfwConfigError};
use crate::fs::FileSystem;

/// Validate whitelist `contents` read from `file`.
///
/// Any malformed line fails the whole file; so does a file with no entries.
pub fn parse_whitelist(contents: &str, file: &Path) -> Result<Vec<String>> {
    let mut entries = Vec::new();

    for (idx, line) in contents.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match validate_ip_cidr(trimmed, true) {
            Some(entry) => entries.push(entry),
            None => {
                return Err(RfwConfigError::WhitelistInvalidEntry {
                    file: file.to_path_buf(),
                    line: idx + 1,
                    entry: trimmed.to_string(),
                });
            }
        }
    }

    if entries.is_empty() {
        return Err(RfwConfigError::WhitelistEmpty {
            file: file.to_path_buf(),
        });
    }
    Ok(entries)
}

/// Read and validate the whitelist at `file`.
pub fn load_whitelist(fs: &dyn FileSystem, file: &Path) -> Result<Vec<String>> {
    let contents = fs.read_to_string(file)?;
    parse_whitelist(&contents, file)
}

// src/config/source.rs

//! Raw key/value config source.
//!
//! The file format is flat `key = value` (or `key: value`) lines:
//!
//! ```text
//! [config]
//! outward.server = true
//! outward.server.port = 7393
//! ; comment
//! # comment
//! ```
//!
//! Section headers are tolerated and ignored: all keys share one namespace.
//! This layer only knows about strings, flags and file paths; which keys are
//! mandatory is decided by [`crate::config::rules`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{Result, RfwConfigError};
use crate::fs::FileSystem;

const TRUE_WORDS: [&str; 4] = ["1", "yes", "true", "on"];
const FALSE_WORDS: [&str; 4] = ["0", "no", "false", "off"];

/// Immutable key -> string mapping read from the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawConfig {
    origin: PathBuf,
    values: BTreeMap<String, String>,
}

impl RawConfig {
    /// Read and parse the config file at `path`.
    pub fn load(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !fs.is_file(path) {
            return Err(RfwConfigError::FileNotFound {
                key: "config".to_string(),
                path: path.to_path_buf(),
            });
        }
        let contents = fs.read_to_string(path)?;
        Self::parse(&contents, path)
    }

    /// Parse config text. `origin` is only used in diagnostics.
    pub fn parse(text: &str, origin: impl AsRef<Path>) -> Result<Self> {
        let origin = origin.as_ref().to_path_buf();
        let mut values = BTreeMap::new();

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if line.starts_with('[') {
                if !line.ends_with(']') {
                    return Err(RfwConfigError::Parse {
                        path: origin,
                        line: line_no,
                        reason: format!("unterminated section header {line:?}"),
                    });
                }
                continue;
            }

            let Some(sep) = line.find(['=', ':']) else {
                return Err(RfwConfigError::Parse {
                    path: origin,
                    line: line_no,
                    reason: format!("expected `key = value`, got {line:?}"),
                });
            };
            let key = line[..sep].trim();
            let value = line[sep + 1..].trim();
            if key.is_empty() {
                return Err(RfwConfigError::Parse {
                    path: origin,
                    line: line_no,
                    reason: "empty key".to_string(),
                });
            }
            if values.insert(key.to_string(), value.to_string()).is_some() {
                return Err(RfwConfigError::DuplicateKey {
                    key: key.to_string(),
                    line: line_no,
                });
            }
        }

        debug!(path = ?origin, keys = values.len(), "parsed config file");
        Ok(Self { origin, values })
    }

    /// Build a config directly from pairs; handy for tests and embedding.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            origin: PathBuf::from("<memory>"),
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn origin(&self) -> &Path {
        &self.origin
    }

    /// Raw value for `key`, `None` if the key is absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Like [`RawConfig::get`] but absence is a [`RfwConfigError::MissingKey`].
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key).ok_or_else(|| RfwConfigError::MissingKey {
            key: key.to_string(),
        })
    }

    /// Boolean flag; an absent key reads as `false`.
    pub fn get_flag(&self, key: &str) -> Result<bool> {
        let Some(raw) = self.get(key) else {
            return Ok(false);
        };
        let word = raw.to_lowercase();
        if TRUE_WORDS.contains(&word.as_str()) {
            Ok(true)
        } else if FALSE_WORDS.contains(&word.as_str()) {
            Ok(false)
        } else {
            Err(RfwConfigError::InvalidValue {
                key: key.to_string(),
                reason: format!(
                    "It should be a boolean (true/false, yes/no, on/off, 1/0), got {raw:?}"
                ),
            })
        }
    }

    /// Path-valued key that must name an existing regular file.
    pub fn get_file(&self, fs: &dyn FileSystem, key: &str) -> Result<PathBuf> {
        let path = PathBuf::from(self.require(key)?);
        if !fs.is_file(&path) {
            return Err(RfwConfigError::FileNotFound {
                key: key.to_string(),
                path,
            });
        }
        Ok(path)
    }
}

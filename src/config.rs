//! Per-pack configuration parsed from `<pack>/.dodot.toml`.
//!
//! The config is optional and additive: `skip` removes the pack from
//! discovery, `[[ignore]]` suppresses files, `[[rules]]` appends matching
//! rules after the defaults, and `[[overrides]]` adds highest-priority
//! matches. Handler names are resolved against the registry when the rule
//! list is built, not here.

use serde::Deserialize;
use std::path::Path;

use crate::error::Error;
use crate::platform::Fs;

/// Optional per-pack config file name.
pub const PACK_CONFIG_FILE: &str = ".dodot.toml";

/// Ignore marker: its presence drops the pack (at the top level) or the
/// containing subtree (nested). Contents are irrelevant.
pub const PACK_IGNORE_FILE: &str = ".dodotignore";

/// Parsed `.dodot.toml`. Every field defaults to empty so an absent file
/// and an empty file behave identically.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackConfig {
    /// If true, discovery filters the pack out.
    #[serde(default)]
    pub skip: bool,
    /// Globs suppressing files within the pack.
    #[serde(default)]
    pub ignore: Vec<IgnoreEntry>,
    /// Matching rules appended after the defaults, evaluated in order.
    #[serde(default)]
    pub rules: Vec<RuleEntry>,
    /// Highest-priority matches, evaluated before everything else.
    #[serde(default)]
    pub overrides: Vec<OverrideEntry>,
}

/// A single `[[ignore]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct IgnoreEntry {
    /// Glob matched against the pack-relative path.
    pub path: String,
}

/// A single `[[rules]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleEntry {
    pub trigger: TriggerKind,
    pub pattern: String,
    pub handler: String,
    /// Handler-specific options, validated by the handler at plan time.
    #[serde(default)]
    pub options: toml::Table,
}

/// Trigger discriminant as written in config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    Filename,
    Glob,
    Extension,
    Directory,
}

/// A single `[[overrides]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct OverrideEntry {
    /// Glob matched against the pack-relative path.
    pub pattern: String,
    pub handler: String,
    /// Handler-specific options, same as on `[[rules]]`.
    #[serde(default)]
    pub options: toml::Table,
}

impl PackConfig {
    /// Load and parse a pack config file.
    pub fn load(path: &Path, fs: &impl Fs) -> Result<Self, Error> {
        let contents = fs
            .read_to_string(path)
            .map_err(|e| Error::io("read", path, e))?;
        toml::from_str(&contents).map_err(|e| Error::BadConfig {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })
    }
}

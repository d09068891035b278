//! Rule engine: an ordered trigger list mapping each pack file to at most
//! one handler.
//!
//! The effective list for a pack is its `[[overrides]]` first, then the
//! global defaults, then its `[[rules]]`. Evaluation is first match wins;
//! an ignore glob drops the file before any rule runs. Directory triggers
//! consume the directory whole — its contents are never matched
//! individually.

use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};

use crate::config::{PACK_CONFIG_FILE, PACK_IGNORE_FILE, RuleEntry, TriggerKind};
use crate::error::Error;
use crate::handlers::Handler;
use crate::packs::Pack;
use crate::platform::Fs;

/// Globs match pack-relative paths; `*` never crosses a separator, so
/// `*.sh` only sees the pack root.
fn match_options() -> MatchOptions {
    MatchOptions {
        require_literal_separator: true,
        ..MatchOptions::new()
    }
}

/// How a rule decides whether it owns a path.
#[derive(Debug, Clone)]
pub enum Trigger {
    /// Basename equality (files only).
    Filename(String),
    /// Glob against the pack-relative path (files only, unless the rule is
    /// an override).
    Glob(Pattern),
    /// Extension equality, without the leading dot (files only).
    Extension(String),
    /// Matches the directory itself, not its contents.
    Directory(String),
}

/// One entry of the ordered rule list.
#[derive(Debug, Clone)]
pub struct Rule {
    pub trigger: Trigger,
    pub handler: Handler,
    pub options: toml::Table,
    pub is_override: bool,
}

impl Rule {
    fn matches(&self, rel: &Path, name: &str, is_dir: bool) -> bool {
        if is_dir {
            return match &self.trigger {
                Trigger::Directory(dir) => name == dir,
                // Overrides may route whole directories; plain globs only
                // see files.
                Trigger::Glob(pattern) if self.is_override => {
                    pattern.matches_path_with(rel, match_options())
                }
                _ => false,
            };
        }
        match &self.trigger {
            Trigger::Filename(filename) => name == filename,
            Trigger::Glob(pattern) => pattern.matches_path_with(rel, match_options()),
            Trigger::Extension(ext) => {
                rel.extension().and_then(|e| e.to_str()) == Some(ext.as_str())
            }
            Trigger::Directory(_) => false,
        }
    }
}

/// Immutable record pairing a file with the handler that owns it.
#[derive(Debug, Clone)]
pub struct RuleMatch {
    pub pack: String,
    /// Path relative to the pack root.
    pub rel: PathBuf,
    /// Absolute path of the source inside the pack.
    pub abs: PathBuf,
    pub handler: Handler,
    pub options: toml::Table,
    pub is_override: bool,
}

/// The stock rule set applied to every pack, ahead of its own `[[rules]]`.
pub fn default_rules() -> Vec<Rule> {
    let plain = |trigger, handler| Rule {
        trigger,
        handler,
        options: toml::Table::new(),
        is_override: false,
    };
    vec![
        plain(
            Trigger::Filename("install.sh".to_string()),
            Handler::Install,
        ),
        plain(Trigger::Filename("Brewfile".to_string()), Handler::Homebrew),
        plain(Trigger::Glob(default_pattern("*.sh")), Handler::Shell),
        plain(Trigger::Directory("bin".to_string()), Handler::Path),
        plain(Trigger::Glob(default_pattern(".*rc")), Handler::Symlink),
    ]
}

fn default_pattern(pattern: &str) -> Pattern {
    Pattern::new(pattern).expect("default pattern is valid")
}

fn compile_pattern(pattern: &str) -> Result<Pattern, Error> {
    Pattern::new(pattern).map_err(|source| Error::BadPattern {
        pattern: pattern.to_string(),
        source,
    })
}

fn resolve_handler(name: &str) -> Result<Handler, Error> {
    Handler::from_name(name).ok_or_else(|| Error::UnknownHandler(name.to_string()))
}

fn compile_trigger(entry: &RuleEntry) -> Result<Trigger, Error> {
    Ok(match entry.trigger {
        TriggerKind::Filename => Trigger::Filename(entry.pattern.clone()),
        TriggerKind::Glob => Trigger::Glob(compile_pattern(&entry.pattern)?),
        TriggerKind::Extension => {
            Trigger::Extension(entry.pattern.trim_start_matches('.').to_string())
        }
        TriggerKind::Directory => Trigger::Directory(entry.pattern.clone()),
    })
}

/// Build a pack's effective rule list. Unknown handler names and malformed
/// patterns fail here, before any mutation has happened.
pub fn rules_for_pack(pack: &Pack) -> Result<Vec<Rule>, Error> {
    let mut rules = Vec::new();
    for entry in &pack.config.overrides {
        rules.push(Rule {
            trigger: Trigger::Glob(compile_pattern(&entry.pattern)?),
            handler: resolve_handler(&entry.handler)?,
            options: entry.options.clone(),
            is_override: true,
        });
    }
    rules.extend(default_rules());
    for entry in &pack.config.rules {
        rules.push(Rule {
            trigger: compile_trigger(entry)?,
            handler: resolve_handler(&entry.handler)?,
            options: entry.options.clone(),
            is_override: false,
        });
    }
    Ok(rules)
}

/// Walk a pack and produce at most one match per file, first match wins.
///
/// Honours the pack's ignore globs and nested `.dodotignore` markers
/// (either drops a whole subtree).
pub fn match_pack(pack: &Pack, rules: &[Rule], fs: &impl Fs) -> Result<Vec<RuleMatch>, Error> {
    let ignores: Vec<Pattern> = pack
        .config
        .ignore
        .iter()
        .map(|entry| compile_pattern(&entry.path))
        .collect::<Result<_, _>>()?;

    let mut matches = Vec::new();
    walk(pack, rules, &ignores, &pack.path, Path::new(""), fs, &mut matches)?;
    Ok(matches)
}

fn walk(
    pack: &Pack,
    rules: &[Rule],
    ignores: &[Pattern],
    dir: &Path,
    prefix: &Path,
    fs: &impl Fs,
    out: &mut Vec<RuleMatch>,
) -> Result<(), Error> {
    let entries = fs
        .read_dir(dir)
        .map_err(|e| Error::io("read dir", dir, e))?;

    for entry in entries {
        let name = entry.file_name();
        if name == PACK_CONFIG_FILE || name == PACK_IGNORE_FILE {
            continue;
        }
        let rel = prefix.join(&name);
        if ignores
            .iter()
            .any(|pattern| pattern.matches_path_with(&rel, match_options()))
        {
            continue;
        }

        if entry.is_dir {
            if fs.exists(&entry.path.join(PACK_IGNORE_FILE)) {
                continue;
            }
            if let Some(rule) = rules.iter().find(|r| r.matches(&rel, &name, true)) {
                out.push(make_match(pack, &rel, &entry.path, rule));
                continue;
            }
            walk(pack, rules, ignores, &entry.path, &rel, fs, out)?;
        } else if entry.is_file || (entry.is_symlink && fs.is_file(&entry.path)) {
            if let Some(rule) = rules.iter().find(|r| r.matches(&rel, &name, false)) {
                out.push(make_match(pack, &rel, &entry.path, rule));
            }
        }
    }
    Ok(())
}

fn make_match(pack: &Pack, rel: &Path, abs: &Path, rule: &Rule) -> RuleMatch {
    RuleMatch {
        pack: pack.name.clone(),
        rel: rel.to_path_buf(),
        abs: abs.to_path_buf(),
        handler: rule.handler,
        options: rule.options.clone(),
        is_override: rule.is_override,
    }
}

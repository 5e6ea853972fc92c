//! Environment file loader
//!
//! Reads `name = value` assignments from an env file and overlays them on the
//! process environment. The resulting [`EnvContext`] is what every spawned
//! shell command sees as its environment.
//!
//! # Format
//!
//! ```text
//! # comment
//! CC = clang
//! CFLAGS = -O2 \
//!     -Wall
//! EMPTY = ""
//! GREETING = "hello world"
//! ```
//!
//! - A trailing `\` continues the value on the next line; the continuation
//!   line is trimmed and appended.
//! - Values are split with shell quoting rules and rejoined with single spaces.
//! - A value that ends up empty unsets the variable.
//! - Only whole lines starting with `#` are comments; `#` in a value is literal.

use anyhow::{Context, Result as AnyResult};
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{Error, Result};
use crate::template::syntax::split_words;

/// Resolved environment available to every executed command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvContext {
    vars: BTreeMap<String, String>,
}

impl EnvContext {
    /// Snapshot of the current process environment
    ///
    /// Entries that are not valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        Self::from_vars(
            std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?))),
        )
    }

    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Load the process environment overlaid by the env file at `path`
    ///
    /// The file is created empty if it does not exist.
    pub fn load(path: &Path) -> AnyResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "creating empty env file");
            fs::write(path, "")
                .with_context(|| format!("Failed to create env file: {}", path.display()))?;
        }

        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read env file: {}", path.display()))?;

        Self::from_process()
            .with_overlay(&source)
            .with_context(|| format!("Invalid env file: {}", path.display()))
    }

    /// Apply the assignments in `source` on top of this context, in file order
    pub fn with_overlay(mut self, source: &str) -> Result<Self> {
        // (first line number, accumulated text) of a value still being continued
        let mut pending: Option<(usize, String)> = None;

        for (idx, raw) in source.lines().enumerate() {
            let text = raw.trim();

            let (start, mut logical) = match pending.take() {
                Some(entry) => entry,
                None => {
                    if text.is_empty() || text.starts_with('#') {
                        continue;
                    }
                    (idx + 1, String::new())
                }
            };

            match text.strip_suffix('\\') {
                Some(head) => {
                    logical.push_str(head);
                    pending = Some((start, logical));
                }
                None => {
                    logical.push_str(text);
                    self.assign(start, &logical)?;
                }
            }
        }

        // A continuation at end of file simply ends the value
        if let Some((start, logical)) = pending {
            self.assign(start, &logical)?;
        }

        Ok(self)
    }

    fn assign(&mut self, line: usize, logical: &str) -> Result<()> {
        let malformed = |reason: &str| Error::MalformedEnvEntry {
            line,
            reason: reason.to_string(),
        };

        let (name, value) = logical
            .split_once('=')
            .ok_or_else(|| malformed("expected `name = value`"))?;

        let name = name.trim();
        if name.is_empty() {
            return Err(malformed("missing variable name"));
        }
        if name.contains(char::is_whitespace) {
            return Err(malformed("variable name contains whitespace"));
        }
        if has_unquoted_equals(value) {
            return Err(malformed("unquoted '=' in value"));
        }

        let words = split_words(value).ok_or_else(|| malformed("unbalanced quotes in value"))?;
        let value = words.join(" ");

        if value.is_empty() {
            if self.vars.remove(name).is_some() {
                debug!(variable = name, "unset by env file");
            }
        } else {
            self.vars.insert(name.to_string(), value);
        }

        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterate over all variables in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Variables in a form `std::process::Command::envs` accepts
    pub fn envs(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.vars.iter().map(|(k, v)| (OsStr::new(k), OsStr::new(v)))
    }
}

/// Whether `value` contains an `=` outside of single or double quotes
fn has_unquoted_equals(value: &str) -> bool {
    let mut chars = value.chars();
    let mut single = false;
    let mut double = false;

    while let Some(c) = chars.next() {
        match c {
            '\\' if !single => {
                chars.next();
            }
            '\'' if !double => single = !single,
            '"' if !single => double = !double,
            '=' if !single && !double => return true,
            _ => {}
        }
    }

    false
}

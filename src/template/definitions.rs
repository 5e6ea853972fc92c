/// Macro definition extraction
///
/// Definitions are whole lines of the form `@name = body`. A body line ending
/// in `\` continues on the next line; the backslash is dropped and the newline
/// kept. Inside a body `\n` also stands for a newline and `\\n` for a literal
/// `\n`. Definition lines are removed from the text that gets expanded.
use std::collections::HashMap;
use tracing::debug;

use super::syntax::{identifier_len, ESCAPE, INVOKE};
use crate::error::{Error, RegionKind, Result};

/// Name to template body mapping, built once per run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroTable {
    macros: HashMap<String, String>,
}

impl MacroTable {
    /// Pull every definition out of `src`
    ///
    /// Returns the table and the remaining text with definition lines
    /// (including their line terminators) removed.
    pub fn extract(src: &str) -> Result<(Self, String)> {
        let mut table = Self::default();
        let mut residual = String::with_capacity(src.len());
        let mut lines = src.split_inclusive('\n');

        while let Some(line) = lines.next() {
            let Some((name, first)) = parse_header(line) else {
                residual.push_str(line);
                continue;
            };

            let mut body = String::new();
            let mut segment = first;
            let mut terminated = line.ends_with('\n');

            while let Some(head) = segment.strip_suffix(ESCAPE) {
                if !terminated {
                    return Err(Error::unterminated(RegionKind::Definition, line));
                }
                body.push_str(head);
                body.push('\n');

                let next = lines
                    .next()
                    .ok_or_else(|| Error::unterminated(RegionKind::Definition, line))?;
                terminated = next.ends_with('\n');
                segment = strip_terminator(next);
            }
            body.push_str(segment);

            table.define(name, &unescape_newlines(body.trim_end()));
        }

        debug!(macro_count = table.len(), "extracted macro definitions");
        Ok((table, residual))
    }

    /// Add or replace a definition; the last one for a name wins
    pub fn define(&mut self, name: &str, body: &str) {
        if self
            .macros
            .insert(name.to_string(), body.to_string())
            .is_some()
        {
            debug!(macro_name = name, "macro redefined");
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.macros.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}

fn unescape_newlines(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;

    while let Some(i) = rest.find(ESCAPE) {
        out.push_str(&rest[..i]);
        let tail = &rest[i + 1..];
        if let Some(after) = tail.strip_prefix('n') {
            out.push('\n');
            rest = after;
        } else if let Some(after) = tail.strip_prefix("\\n") {
            out.push_str("\\n");
            rest = after;
        } else {
            out.push(ESCAPE);
            rest = tail;
        }
    }

    out.push_str(rest);
    out
}

fn strip_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Recognize `  @name = body` and return the name and the first body segment
fn parse_header(line: &str) -> Option<(&str, &str)> {
    let rest = strip_terminator(line).trim_start().strip_prefix(INVOKE)?;
    let name_len = identifier_len(rest)?;
    let (name, rest) = rest.split_at(name_len);
    let body = rest.trim_start().strip_prefix('=')?;
    Some((name, body.trim_start()))
}

//! Recursive macro expansion
//!
//! Resolves every `@[name args...]` against a [`MacroTable`]. A bound body
//! wrapped in back-quotes runs as a shell command; anything else is expanded
//! again before it replaces the invocation.
use tracing::debug;

use super::binding::bind;
use super::definitions::MacroTable;
use super::syntax::{self, Mode, Node, TICK};
use crate::error::{Error, Result};
use crate::shell::Shell;

pub struct Expander<'a> {
    macros: &'a MacroTable,
    shell: &'a Shell<'a>,
    max_depth: Option<usize>,
}

impl<'a> Expander<'a> {
    /// Expander with unbounded recursion
    ///
    /// A macro that keeps invoking itself never terminates; use
    /// [`Expander::with_max_depth`] to turn that into an error.
    pub fn new(macros: &'a MacroTable, shell: &'a Shell<'a>) -> Self {
        Self {
            macros,
            shell,
            max_depth: None,
        }
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn shell(&self) -> &Shell<'a> {
        self.shell
    }

    /// Expand every invocation in `src`
    pub fn expand(&self, src: &str) -> Result<String> {
        self.expand_at(src, 0)
    }

    fn expand_at(&self, src: &str, depth: usize) -> Result<String> {
        let mut out = String::with_capacity(src.len());

        for node in syntax::parse(src, Mode::Invocations)? {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Escaped(c) => out.push(c),
                Node::Region(contents) => out.push_str(&self.invoke(contents, depth)?),
            }
        }

        Ok(out)
    }

    fn invoke(&self, contents: &str, depth: usize) -> Result<String> {
        if let Some(limit) = self.max_depth {
            if depth >= limit {
                return Err(Error::RecursionLimit { limit });
            }
        }

        // Inner invocations can supply arguments
        let contents = self.expand_at(contents, depth + 1)?;
        let words = syntax::split_words(&contents).ok_or_else(|| Error::InvalidArguments {
            contents: contents.clone(),
        })?;
        let (name, args) = words
            .split_first()
            .ok_or_else(|| Error::InvalidArguments {
                contents: contents.clone(),
            })?;

        let body = self
            .macros
            .get(name)
            .ok_or_else(|| Error::UndefinedMacro { name: name.clone() })?;

        debug!(
            macro_name = name.as_str(),
            args = args.len(),
            depth = depth,
            "expanding macro"
        );

        let bound = bind(body, name, args)?;
        let bound = bound.trim();

        match shell_body(bound) {
            Some(command) => {
                let command = self.expand_at(command, depth + 1)?;
                Ok(self.shell.run(&command)?.trim().to_string())
            }
            None => self.expand_at(bound, depth + 1),
        }
    }
}

/// Inner text of a body that is exactly one back-quoted command
fn shell_body(bound: &str) -> Option<&str> {
    if bound.len() < 2 * TICK.len_utf8() {
        return None;
    }
    bound.strip_prefix(TICK)?.strip_suffix(TICK)
}

//! Top-level command substitution
//!
//! Replaces each back-quoted region in already-expanded text with the output
//! of running it. Region contents are macro-expanded first; command output is
//! inserted as-is and never rescanned.
use tracing::debug;

use crate::error::Result;
use crate::template::syntax::{self, Mode, Node, TICK};
use crate::template::Expander;

/// Run every top-level command region in `src`
pub fn substitute_commands(src: &str, expander: &Expander<'_>) -> Result<String> {
    let mut out = String::with_capacity(src.len());
    let mut count = 0usize;

    for node in syntax::parse(src, Mode::Commands)? {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Escaped(c) => out.push(c),
            Node::Region(content) if content.trim().is_empty() => {
                out.push(TICK);
                out.push_str(content);
                out.push(TICK);
            }
            Node::Region(content) => {
                let command = expander.expand(content.trim())?;
                let output = expander.shell().run(&command)?;
                out.push_str(output.trim_end());
                count += 1;
            }
        }
    }

    debug!(command_count = count, "substituted command regions");
    Ok(out)
}

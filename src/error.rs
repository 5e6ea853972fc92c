use std::fmt;
use std::io;

use thiserror::Error;

/// Result alias used by every generation stage
pub type Result<T> = std::result::Result<T, Error>;

/// Which delimited construct was left open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    Definition,
    Invocation,
    Command,
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Definition => write!(f, "macro definition"),
            Self::Invocation => write!(f, "macro invocation"),
            Self::Command => write!(f, "command region"),
        }
    }
}

/// Errors that abort a generation run
#[derive(Debug, Error)]
pub enum Error {
    #[error("line {line}: malformed environment entry ({reason})")]
    MalformedEnvEntry { line: usize, reason: String },

    #[error("undefined macro '{name}'")]
    UndefinedMacro { name: String },

    #[error("macro '{name}' references argument {{{index}}} but only {supplied} argument(s) were supplied")]
    ArgumentCount {
        name: String,
        index: usize,
        supplied: usize,
    },

    #[error("macro '{name}' has an invalid placeholder: {reason}")]
    InvalidPlaceholder { name: String, reason: String },

    #[error("cannot split macro arguments (unbalanced quotes): {contents}")]
    InvalidArguments { contents: String },

    #[error("command `{command}` {}", describe_exit(.code))]
    CommandFailed { command: String, code: Option<i32> },

    #[error("failed to spawn shell for `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("unterminated {kind} near `{excerpt}`")]
    UnterminatedRegion { kind: RegionKind, excerpt: String },

    #[error("macro expansion exceeded the maximum depth of {limit}")]
    RecursionLimit { limit: usize },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {}", code),
        None => "was terminated by a signal".to_string(),
    }
}

impl Error {
    /// Build an unterminated-region error quoting the start of the open region
    pub(crate) fn unterminated(kind: RegionKind, rest: &str) -> Self {
        let line = rest.lines().next().unwrap_or_default();
        let excerpt: String = line.chars().take(40).collect();
        Self::UnterminatedRegion { kind, excerpt }
    }
}

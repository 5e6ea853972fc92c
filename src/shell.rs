/// Shell command execution
///
/// Runs a command line through the platform shell with the resolved
/// environment, blocking until it exits and capturing its stdout.
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;
use tracing::{debug, warn};

use crate::env_file::EnvContext;
use crate::error::{Error, Result};

#[cfg(unix)]
const SHELL: &str = "sh";
#[cfg(unix)]
const SHELL_FLAG: &str = "-c";

#[cfg(windows)]
const SHELL: &str = "cmd";
#[cfg(windows)]
const SHELL_FLAG: &str = "/C";

/// Executes commands with a fixed environment and working directory
pub struct Shell<'a> {
    env: &'a EnvContext,
    program: PathBuf,
    working_dir: PathBuf,
}

impl<'a> Shell<'a> {
    pub fn new(env: &'a EnvContext, working_dir: &Path) -> Self {
        // Resolve against the PATH commands will actually see
        let program = which::which_in(SHELL, env.get("PATH"), working_dir).unwrap_or_else(|e| {
            warn!(
                shell = SHELL,
                error = %e,
                "could not find shell in PATH, trying as-is"
            );
            PathBuf::from(SHELL)
        });

        Self {
            env,
            program,
            working_dir: working_dir.to_path_buf(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run `command` and return its raw standard output
    ///
    /// Standard error and standard input are inherited. A non-zero exit is an
    /// error carrying the command and its status.
    pub fn run(&self, command: &str) -> Result<String> {
        let start = Instant::now();
        debug!(command = command, "running shell command");

        let output = Command::new(&self.program)
            .arg(SHELL_FLAG)
            .arg(command)
            .env_clear()
            .envs(self.env.envs())
            .current_dir(&self.working_dir)
            .stdin(Stdio::inherit())
            .stderr(Stdio::inherit())
            .stdout(Stdio::piped())
            .output()
            .map_err(|source| Error::Spawn {
                command: command.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(Error::CommandFailed {
                command: command.to_string(),
                code: output.status.code(),
            });
        }

        debug!(
            command = command,
            size_bytes = output.stdout.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "shell command finished"
        );

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

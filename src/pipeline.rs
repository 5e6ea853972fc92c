//! Generation pipeline
//!
//! load env -> strip definitions -> expand macros -> substitute commands -> write
//!
//! The output is rendered completely in memory and then atomically swapped
//! into place, so a failed run never leaves a half-written build file behind.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

use crate::env_file::EnvContext;
use crate::logging::stages;
use crate::shell::Shell;
use crate::substitute::substitute_commands;
use crate::template::{Expander, MacroTable};

pub const DEFAULT_ENV_FILE: &str = "build.env";
pub const DEFAULT_TEMPLATE: &str = "build.template.ninja";
pub const DEFAULT_OUTPUT: &str = "build.ninja";

/// One generation run's inputs and output
#[derive(Debug, Clone)]
pub struct Generator {
    directory: PathBuf,
    env_file: PathBuf,
    template: PathBuf,
    output: PathBuf,
    max_depth: Option<usize>,
}

/// What a run rendered
#[derive(Debug, Clone)]
pub struct Rendered {
    pub text: String,
    pub macro_count: usize,
}

/// What a completed run wrote
#[derive(Debug, Clone)]
pub struct GenerateSummary {
    pub output: PathBuf,
    pub macro_count: usize,
    pub size_bytes: usize,
}

impl Generator {
    /// Generator using the standard file names inside `directory`
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        let directory = directory.into();
        Self {
            env_file: directory.join(DEFAULT_ENV_FILE),
            template: directory.join(DEFAULT_TEMPLATE),
            output: directory.join(DEFAULT_OUTPUT),
            directory,
            max_depth: None,
        }
    }

    /// Override the env file; relative paths resolve against the directory
    pub fn env_file(mut self, path: impl AsRef<Path>) -> Self {
        self.env_file = self.directory.join(path);
        self
    }

    pub fn template(mut self, path: impl AsRef<Path>) -> Self {
        self.template = self.directory.join(path);
        self
    }

    pub fn output(mut self, path: impl AsRef<Path>) -> Self {
        self.output = self.directory.join(path);
        self
    }

    /// Fail instead of recursing past `max_depth` nested invocations
    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Run every stage and return the final text without writing it
    pub fn render(&self) -> Result<Rendered> {
        let env = EnvContext::load(&self.env_file)?;
        info!(
            stage = stages::ENV,
            path = %self.env_file.display(),
            variables = env.len(),
            "environment loaded"
        );

        let source = fs::read_to_string(&self.template)
            .with_context(|| format!("Failed to read template: {}", self.template.display()))?;

        let (macros, residual) = MacroTable::extract(&source)
            .with_context(|| format!("Invalid template: {}", self.template.display()))?;
        info!(
            stage = stages::DEFINITIONS,
            macro_count = macros.len(),
            "macro definitions extracted"
        );

        let shell = Shell::new(&env, &self.directory);
        let expander = Expander::new(&macros, &shell).with_max_depth(self.max_depth);

        let expanded = expander
            .expand(&residual)
            .with_context(|| format!("Macro expansion failed in {}", self.template.display()))?;
        info!(
            stage = stages::EXPAND,
            size_bytes = expanded.len(),
            "macros expanded"
        );

        let text = substitute_commands(&expanded, &expander).with_context(|| {
            format!(
                "Command substitution failed in {}",
                self.template.display()
            )
        })?;
        info!(
            stage = stages::SUBSTITUTE,
            size_bytes = text.len(),
            "commands substituted"
        );

        Ok(Rendered {
            text,
            macro_count: macros.len(),
        })
    }

    /// Render and atomically replace the output file
    pub fn generate(&self) -> Result<GenerateSummary> {
        let rendered = self.render()?;
        write_atomic(&self.output, rendered.text.as_bytes())?;

        info!(
            stage = stages::WRITE,
            path = %self.output.display(),
            size_bytes = rendered.text.len(),
            "build file written"
        );

        Ok(GenerateSummary {
            output: self.output.clone(),
            macro_count: rendered.macro_count,
            size_bytes: rendered.text.len(),
        })
    }
}

/// Write `contents` to a temp file next to `path`, then rename it over `path`
fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if parent != Path::new("") => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temp file in {}", parent.display()))?;
    file.write_all(contents)
        .context("Failed to write generated output")?;
    file.persist(path)
        .with_context(|| format!("Failed to write output: {}", path.display()))?;

    Ok(())
}

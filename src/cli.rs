use clap::Parser;
use std::path::PathBuf;

use ninjagen::pipeline::{DEFAULT_ENV_FILE, DEFAULT_OUTPUT, DEFAULT_TEMPLATE};

/// ninjagen - Macro-expanding ninja build file generator
///
/// Reads build.env and build.template.ninja, expands @[macro] invocations and
/// `command` regions, and writes build.ninja.
#[derive(Parser, Debug)]
#[command(name = "ninjagen")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Macro-expanding ninja build file generator", long_about = None)]
pub struct Cli {
    /// Directory to run in; relative paths and shell commands resolve here
    #[arg(short = 'C', long, env = "NINJAGEN_DIRECTORY", default_value = ".")]
    pub directory: PathBuf,

    /// Environment file (created empty if missing)
    #[arg(long, env = "NINJAGEN_ENV_FILE", default_value = DEFAULT_ENV_FILE)]
    pub env_file: PathBuf,

    /// Template to expand
    #[arg(short = 't', long, env = "NINJAGEN_TEMPLATE", default_value = DEFAULT_TEMPLATE)]
    pub template: PathBuf,

    /// Generated build file
    #[arg(short = 'o', long, env = "NINJAGEN_OUTPUT", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Fail when macros nest deeper than this (unbounded by default)
    #[arg(long, env = "NINJAGEN_MAX_DEPTH")]
    pub max_depth: Option<usize>,

    /// Print the result to stdout instead of writing the output file
    #[arg(long)]
    pub stdout: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["ninjagen"]).unwrap();
        assert_eq!(cli.directory, PathBuf::from("."));
        assert_eq!(cli.env_file, PathBuf::from("build.env"));
        assert_eq!(cli.template, PathBuf::from("build.template.ninja"));
        assert_eq!(cli.output, PathBuf::from("build.ninja"));
        assert_eq!(cli.max_depth, None);
        assert!(!cli.stdout);
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "ninjagen",
            "-C",
            "project",
            "-t",
            "gen.ninja.in",
            "-o",
            "out/build.ninja",
            "--max-depth",
            "64",
            "--stdout",
        ])
        .unwrap();
        assert_eq!(cli.directory, PathBuf::from("project"));
        assert_eq!(cli.template, PathBuf::from("gen.ninja.in"));
        assert_eq!(cli.output, PathBuf::from("out/build.ninja"));
        assert_eq!(cli.max_depth, Some(64));
        assert!(cli.stdout);
    }
}

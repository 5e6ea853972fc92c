// Common test utilities shared across acceptance tests
//
// Every test gets its own temporary project directory holding build.env,
// build.template.ninja and the generated build.ninja. The binary runs with
// that directory as its working directory, so nothing touches the repo.

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const ENV_FILE: &str = "build.env";
pub const TEMPLATE: &str = "build.template.ninja";
pub const OUTPUT: &str = "build.ninja";

/// Isolated project directory for one test
pub struct TestProject {
    temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestProject {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Project with the given template and no env file
    pub fn with_template(template: &str) -> Self {
        let project = Self::new();
        project.write(TEMPLATE, template);
        project
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.path().join(name)
    }

    pub fn write(&self, name: &str, content: &str) {
        let path = self.file(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(path, content).expect("Failed to write file");
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.file(name)).expect("Failed to read file")
    }

    pub fn output(&self) -> String {
        self.read(OUTPUT)
    }

    /// The ninjagen binary, running inside this project
    pub fn ninjagen(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_ninjagen"));
        cmd.current_dir(self.path())
            .env("NINJAGEN_LOG_FORMAT", "compact")
            .env("RUST_LOG", "warn")
            .env_remove("NINJAGEN_DIRECTORY")
            .env_remove("NINJAGEN_ENV_FILE")
            .env_remove("NINJAGEN_TEMPLATE")
            .env_remove("NINJAGEN_OUTPUT")
            .env_remove("NINJAGEN_MAX_DEPTH");
        cmd
    }
}

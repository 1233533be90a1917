//! Test helpers for behavioral specifications.
//!
//! Provides a high-level DSL for driving the `coder` binary against a
//! throwaway workspace directory.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;

/// Create a CLI builder for `coder` invocations.
pub fn cli() -> CliBuilder {
    CliBuilder::new()
}

pub struct CliBuilder {
    args: Vec<String>,
    dir: Option<PathBuf>,
}

impl CliBuilder {
    fn new() -> Self {
        Self { args: Vec::new(), dir: None }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    pub fn pwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.dir = Some(path.into());
        self
    }

    fn command(self) -> Command {
        let mut cmd = Command::cargo_bin("coder").expect("coder binary should build");
        cmd.args(&self.args);
        if let Some(dir) = self.dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    pub fn passes(self) -> RunAssert {
        let output = self.command().output().expect("command should run");
        assert!(
            output.status.success(),
            "expected success, got exit code {:?}\nstdout: {}\nstderr: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    pub fn fails(self) -> RunAssert {
        let output = self.command().output().expect("command should run");
        assert!(
            !output.status.success(),
            "expected failure, but the command passed\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    pub fn run(self) -> RunAssert {
        let output = self.command().output().expect("command should run");
        RunAssert { output }
    }
}

pub struct RunAssert {
    output: std::process::Output,
}

impl RunAssert {
    pub fn code(&self) -> Option<i32> {
        self.output.status.code()
    }

    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(stdout.contains(expected), "stdout does not contain '{expected}'\nstdout: {stdout}");
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = self.stderr();
        assert!(stderr.contains(expected), "stderr does not contain '{expected}'\nstderr: {stderr}");
        self
    }

    pub fn code_eq(self, expected: i32) -> Self {
        assert_eq!(self.code(), Some(expected), "stderr: {}", self.stderr());
        self
    }
}

/// A throwaway workspace directory with helper methods for the `.coder/`
/// layout the CLI reads and writes.
pub struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    pub fn empty() -> Self {
        Self { dir: tempfile::tempdir().expect("tempdir") }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, path: impl AsRef<Path>, content: &str) {
        let full_path = self.dir.path().join(path.as_ref());
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full_path, content).unwrap();
    }

    pub fn read(&self, path: impl AsRef<Path>) -> Option<String> {
        std::fs::read_to_string(self.dir.path().join(path.as_ref())).ok()
    }

    /// Run `coder` in this workspace's directory.
    pub fn coder(&self) -> CliBuilder {
        cli().pwd(self.path())
    }
}

//! Test harness exports.

use assert_cmd::Command;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;

pub fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

pub fn fixture(name: &str) -> PathBuf {
    fixtures_path().join(name)
}

/// A scratch working directory and home, so config discovery never sees the
/// developer's own files.
pub struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Copy a fixture into the sandbox under `name`.
    pub fn copy_fixture(&self, fixture_name: &str, name: &str) -> PathBuf {
        let target = self.path().join(name);
        fs::copy(fixture(fixture_name), &target).expect("Failed to copy fixture");
        target
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let target = self.path().join(name);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&target, contents).expect("Failed to write file");
        target
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("clibones"));
        cmd.current_dir(self.path())
            .env("HOME", self.path())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .env_remove("CLIBONES_LOGLEVEL")
            .env_remove("CLIBONES_LOG")
            .env_remove("CLIBONES_LOG_FORMAT")
            .env_remove("CLIBONES_LOG_STREAM");
        cmd
    }

    pub fn run(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.cmd().args(args).assert()
    }
}

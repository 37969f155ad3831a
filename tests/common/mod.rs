//! Shared fixtures for driving the built binary against a narinfo directory.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::{Duration, UNIX_EPOCH};
use tempfile::TempDir;

#[allow(dead_code)]
pub const HASH: &str = "0123456789abcdef0123456789abcdef";

/// A temporary narinfo directory the binary runs against.
pub struct NarinfoDir {
    pub dir: TempDir,
}

impl NarinfoDir {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `<hash>.narinfo` with `contents` and set its mtime.
    #[allow(dead_code)]
    pub fn descriptor(&self, hash: &str, contents: &str, mtime: Duration) -> PathBuf {
        let path = self.path().join(format!("{hash}.narinfo"));
        fs::write(&path, contents).expect("write narinfo");
        let file = File::options()
            .write(true)
            .open(&path)
            .expect("open narinfo");
        file.set_modified(UNIX_EPOCH + mtime).expect("set mtime");
        path
    }

    /// Run a subcommand with the temp dir as cwd, feeding `stdin`.
    pub fn run(&self, args: &[&str], stdin: &str) -> Output {
        let mut child = Command::new(env!("CARGO_BIN_EXE_narinfo-registration"))
            .args(args)
            .current_dir(self.path())
            .env("NARINFO_REGISTRATION_LOG", "warn")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("spawn narinfo-registration");
        child
            .stdin
            .take()
            .expect("stdin pipe")
            .write_all(stdin.as_bytes())
            .expect("write stdin");
        child.wait_with_output().expect("wait for narinfo-registration")
    }
}

#[allow(dead_code)]
pub fn stdout_json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("parse stdout JSON")
}

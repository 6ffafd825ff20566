#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Throwaway ScaleTail checkout with a `services/` tree.
pub struct Checkout {
    pub dir: TempDir,
}

impl Checkout {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("temp checkout");
        fs::create_dir_all(dir.path().join("services")).expect("services dir");
        Self { dir }
    }

    pub fn root(&self) -> PathBuf {
        fs::canonicalize(self.dir.path()).expect("canonical root")
    }

    pub fn service(&self, rel: &str) -> &Self {
        let dir = self.dir.path().join("services").join(rel);
        fs::create_dir_all(&dir).expect("service dir");
        fs::write(dir.join("compose.yaml"), "services: {}\n").expect("compose");
        fs::write(dir.join(".env"), "TS_AUTHKEY=\n").expect("env");
        self
    }

    pub fn compose_only(&self, rel: &str) -> &Self {
        let dir = self.dir.path().join("services").join(rel);
        fs::create_dir_all(&dir).expect("service dir");
        fs::write(dir.join("compose.yaml"), "services: {}\n").expect("compose");
        self
    }

    pub fn file(&self, rel: &str, contents: &str) -> &Self {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("parent dir");
        }
        fs::write(path, contents).expect("write fixture file");
        self
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// The generator binary pointed at this checkout with a clean environment.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("scaletail-registry").expect("binary builds");
        cmd.env_remove("GITHUB_REPOSITORY")
            .env_remove("GITHUB_REF_NAME")
            .env_remove("SCALETAIL_ROOT")
            .env_remove("RUST_LOG")
            .arg("--root")
            .arg(self.dir.path())
            .current_dir(self.dir.path());
        cmd
    }
}

pub fn read_json(path: &Path) -> serde_json::Value {
    let text = fs::read_to_string(path).expect("read output");
    serde_json::from_str(&text).expect("valid JSON output")
}

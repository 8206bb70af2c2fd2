use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scratch directory holding the marker file and last-file pointer.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn store(&self) -> PathBuf {
        self.dir.path().join("markers.json")
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// `geomark --store <workspace>/markers.json <args>`, isolated from the
    /// developer's own pointer file and config.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("geomark").unwrap();
        cmd.current_dir(self.dir.path())
            .env("GEOMARK_LAST_FILE_POINTER", self.pointer())
            .env("RUST_LOG", "off")
            .arg("--store")
            .arg(self.store());
        cmd
    }

    pub fn pointer(&self) -> PathBuf {
        self.dir.path().join("last_file.txt")
    }

    pub fn add(&self, name: &str, lat: &str, lon: &str) {
        self.cmd()
            .args(["add", "--name", name, "--lat", lat, "--lon", lon])
            .assert()
            .success();
    }
}

pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

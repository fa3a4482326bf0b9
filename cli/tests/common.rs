//! # MedChat CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! Shared helpers for the integration tests. Every command runs inside a
//! temporary directory with its own HOME, so neither the developer's user
//! config nor a `.medchat.toml` further up the tree can leak into a test.
//!

// Not every test file uses every helper.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::net::TcpListener;
use std::path::Path;
use std::process::{Child, Stdio};
use tempfile::TempDir;

/// A scratch working directory that stops the project config search.
pub fn sandbox() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    std::fs::create_dir(dir.path().join(".git")).expect("Failed to create .git marker");
    dir
}

/// `medchat` command rooted in `dir`, with config and logging isolated.
pub fn medchat_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("medchat").expect("Failed to find medchat binary for testing");
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env_remove("RUST_LOG")
        .env_remove("PORT");
    cmd
}

/// Writes `.medchat.toml` into `dir`.
pub fn write_project_config(dir: &Path, content: &str) {
    std::fs::write(dir.join(".medchat.toml"), content).expect("Failed to write .medchat.toml");
}

/// A loopback port that was free a moment ago.
pub fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .and_then(|l| l.local_addr())
        .map(|a| a.port())
        .expect("Failed to find a free port")
}

/// A running `medchat srv`, killed on drop.
pub struct ServerGuard {
    child: Child,
    pub port: u16,
}

impl ServerGuard {
    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }
}

impl Drop for ServerGuard {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Starts `medchat srv` in `dir` with no reply delay and waits until it accepts
/// connections.
pub fn spawn_server(dir: &Path, extra_args: &[&str]) -> ServerGuard {
    let port = free_port();
    let bin = assert_cmd::cargo::cargo_bin("medchat");
    let port_arg = port.to_string();
    let child = std::process::Command::new(bin)
        .args(["srv", "--port", &port_arg, "--delay-ms", "0"])
        .args(extra_args)
        .current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env_remove("PORT")
        .env_remove("RUST_LOG")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to spawn medchat srv");

    let guard = ServerGuard { child, port };
    for _ in 0..100 {
        if std::net::TcpStream::connect(("127.0.0.1", port)).is_ok() {
            return guard;
        }
        std::thread::sleep(std::time::Duration::from_millis(100));
    }
    panic!("medchat srv did not start listening on port {}", port);
}

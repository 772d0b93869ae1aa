#![allow(dead_code)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const PROFILE: &str = "lutris-bwrap-userns-restrict";

/// A fake host rooted in a temp dir, with a config file pointing every path into it.
pub struct TestHost {
    _tmp: TempDir,
    pub root: PathBuf,
    pub config: PathBuf,
}

impl TestHost {
    pub fn new() -> Self {
        Self::with_notifier_script(None)
    }

    /// `script` becomes the body of the legacy notifier; `None` leaves it missing.
    pub fn with_notifier_script(script: Option<&str>) -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().to_path_buf();
        fs::create_dir_all(root.join("etc/apparmor.d/local")).expect("create apparmor dirs");
        fs::create_dir_all(root.join("etc/apparmor.d/disable")).expect("create disable dir");
        fs::create_dir_all(root.join("run")).expect("create run dir");
        fs::create_dir_all(root.join("proc")).expect("create proc dir");

        if let Some(body) = script {
            write_executable(&root.join("notify-reboot-required"), body);
        }

        let config = root.join("postrm.toml");
        fs::write(&config, render_config(&root)).expect("write config");

        Self {
            _tmp: tmp,
            root,
            config,
        }
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    pub fn profile_paths(&self) -> [PathBuf; 2] {
        [
            self.root.join("etc/apparmor.d").join(PROFILE),
            self.root.join("etc/apparmor.d/local").join(PROFILE),
        ]
    }

    pub fn sentinel(&self) -> PathBuf {
        self.root.join("run/reboot-required")
    }

    pub fn package_list(&self) -> PathBuf {
        self.root.join("run/reboot-required.pkgs")
    }

    pub fn override_marker(&self) -> PathBuf {
        self.root.join("etc/apparmor.d/disable").join(PROFILE)
    }

    pub fn enable_feature(&self) {
        fs::write(
            self.root.join("proc/apparmor_restrict_unprivileged_userns"),
            "1\n",
        )
        .expect("write feature marker");
    }

    pub fn install_profiles(&self) {
        for path in self.profile_paths() {
            fs::write(&path, "abi <abi/4.0>,\ninclude <tunables/global>\n").expect("write profile");
        }
    }

    pub fn remaining_profiles(&self) -> usize {
        self.profile_paths().iter().filter(|p| p.exists()).count()
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("lutris-postrm");
        cmd.env_remove("LUTRIS_POSTRM_CONFIG")
            .env("RUST_LOG", "debug")
            .arg("--config")
            .arg(&self.config);
        cmd
    }

    pub fn run_json(&self) -> Value {
        let out = self
            .cmd()
            .arg("--json")
            .arg("remove")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }
}

fn render_config(root: &Path) -> String {
    let p = |rel: &str| root.join(rel).display().to_string();
    format!(
        r#"[package]
name = "lutris"

[markers]
feature = "{feature}"
override_marker = "{override_marker}"

[profiles]
paths = ["{primary}", "{local}"]

[reboot]
sentinel = "{sentinel}"
package_list = "{package_list}"

[[notifiers]]
plugin = {{ kind = "reboot-required" }}

[[notifiers]]
plugin = {{ kind = "update-notifier", path = "{notifier}" }}
"#,
        feature = p("proc/apparmor_restrict_unprivileged_userns"),
        override_marker = p(&format!("etc/apparmor.d/disable/{PROFILE}")),
        primary = p(&format!("etc/apparmor.d/{PROFILE}")),
        local = p(&format!("etc/apparmor.d/local/{PROFILE}")),
        sentinel = p("run/reboot-required"),
        package_list = p("run/reboot-required.pkgs"),
        notifier = p("notify-reboot-required"),
    )
}

#[cfg(unix)]
fn write_executable(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;
    fs::write(path, format!("#!/bin/sh\n{body}\n")).expect("write notifier script");
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).expect("chmod notifier script");
}

#[cfg(not(unix))]
fn write_executable(path: &Path, body: &str) {
    fs::write(path, body).expect("write notifier script");
}

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::time::{SystemTime, UNIX_EPOCH};

pub struct CmdResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
}

/// Throwaway `$HOME` with an empty `Downloads` directory.
pub struct Sandbox {
    root: tempfile::TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create sandbox home");
        fs::create_dir_all(root.path().join("Downloads")).expect("create Downloads");
        Self { root }
    }

    pub fn home(&self) -> &Path {
        self.root.path()
    }

    pub fn downloads(&self) -> PathBuf {
        self.home().join("Downloads")
    }

    pub fn pointer(&self) -> PathBuf {
        self.home().join(".cluster")
    }

    pub fn config_path(&self) -> PathBuf {
        self.home().join(".config").join("kcm").join("config.toml")
    }

    pub fn activity_log(&self) -> PathBuf {
        self.home()
            .join(".local")
            .join("share")
            .join("kcm")
            .join("activity.jsonl")
    }

    /// Drop a kubeconfig into `Downloads` and return its path.
    pub fn add_kubeconfig(&self, name: &str) -> PathBuf {
        let path = self.downloads().join(name);
        fs::write(&path, "apiVersion: v1\nkind: Config\n").expect("write kubeconfig");
        path
    }

    #[cfg(unix)]
    pub fn point_at(&self, target: &Path) {
        std::os::unix::fs::symlink(target, self.pointer()).expect("create pointer");
    }
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis())
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn resolve_bin_path() -> PathBuf {
    if let Some(path) = option_env!("CARGO_BIN_EXE_kcm") {
        return PathBuf::from(path);
    }

    let exe_name = if cfg!(windows) { "kcm.exe" } else { "kcm" };
    let fallback = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .and_then(|deps| deps.parent().map(PathBuf::from))
        .map(|debug_dir| debug_dir.join(exe_name));

    match fallback {
        Some(path) if path.exists() => path,
        _ => panic!("unable to resolve kcm binary path for integration test"),
    }
}

/// Run the binary inside `sandbox` with a scrubbed environment.
pub fn run_cli_case(
    case_name: &str,
    sandbox: &Sandbox,
    args: &[&str],
    envs: &[(&str, &str)],
) -> CmdResult {
    let root = std::env::temp_dir().join("kcm-test-logs");
    fs::create_dir_all(&root).expect("create temp test log dir");

    let log_path = root.join(format!("{}-{}.log", sanitize(case_name), now_millis()));
    let bin_path = resolve_bin_path();

    let mut command = Command::new(&bin_path);
    command
        .args(args)
        .env("HOME", sandbox.home())
        .env("NO_COLOR", "1")
        .env("RUST_BACKTRACE", "1")
        .env_remove("KUBECONFIG")
        .env_remove("KCM_POINTER_PATH")
        .env_remove("KCM_LOG_ENABLED")
        .env_remove("KCM_JSONL_LOG")
        .env_remove("KCM_OUTPUT_FORMAT");
    for (key, value) in envs {
        command.env(key, value);
    }
    let output = command.output().expect("execute kcm command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let mut log_content = String::new();
    log_content.push_str(&format!("case={case_name}\n"));
    log_content.push_str(&format!("bin={}\n", bin_path.display()));
    log_content.push_str(&format!("home={}\n", sandbox.home().display()));
    log_content.push_str(&format!("args={args:?}\n"));
    log_content.push_str(&format!("status={}\n", output.status));
    log_content.push_str("----- stdout -----\n");
    log_content.push_str(&stdout);
    log_content.push('\n');
    log_content.push_str("----- stderr -----\n");
    log_content.push_str(&stderr);
    log_content.push('\n');
    fs::write(&log_path, log_content).expect("write test log");

    CmdResult {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}

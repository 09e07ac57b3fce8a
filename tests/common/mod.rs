use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Runs the `psa` binary in an isolated working directory.
pub struct PsaTest {
    pub temp_dir: TempDir,
    binary_path: PathBuf,
}

impl PsaTest {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        PsaTest {
            temp_dir,
            binary_path: PathBuf::from(env!("CARGO_BIN_EXE_psa")),
        }
    }

    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(&self.binary_path)
            .args(args)
            .current_dir(self.temp_dir.path())
            .env_remove("PSA_SUPPORT_URL")
            .env_remove("PSA_PROJECT_URL")
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to execute psa command")
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Expected command {:?} to fail, but it succeeded",
            args
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }

    /// Write `.psa/<name>` inside the working directory.
    pub fn write_state(&self, name: &str, content: &str) {
        let dir = self.temp_dir.path().join(".psa");
        fs::create_dir_all(&dir).expect("Failed to create .psa");
        fs::write(dir.join(name), content).expect("Failed to write state file");
    }

    pub fn state_exists(&self, name: &str) -> bool {
        self.temp_dir.path().join(".psa").join(name).exists()
    }
}

use crate::reconcile::{parse_version_output, InstalledState};
use std::path::Path;
use std::process::Command;
use tracing::{debug, warn};

/// Asks the installed executables for their version
///
/// The first executable found in `install_dir` is run with `--version`;
/// stdout and stderr are searched together since llama.cpp logs to stderr.
pub fn installed_state(install_dir: &Path, executables: &[String]) -> InstalledState {
    let Some(binary) = executables
        .iter()
        .map(|name| install_dir.join(name))
        .find(|path| path.is_file())
    else {
        debug!(dir = %install_dir.display(), "No installed executable found");
        return InstalledState::Absent;
    };

    let output = match Command::new(&binary).arg("--version").output() {
        Ok(output) => output,
        Err(e) => {
            warn!(binary = %binary.display(), error = %e, "Failed to run installed executable");
            return InstalledState::Unknown;
        }
    };

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push('\n');
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    match parse_version_output(&combined) {
        Some(build) => {
            debug!(binary = %binary.display(), build, "Installed version detected");
            InstalledState::Version(build)
        }
        None => InstalledState::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn names() -> Vec<String> {
        vec!["llama-cli".to_string(), "llama-server".to_string()]
    }

    #[test]
    fn test_absent_when_directory_empty() {
        let dir = TempDir::new().unwrap();
        assert_eq!(installed_state(dir.path(), &names()), InstalledState::Absent);
    }

    #[test]
    fn test_absent_when_directory_missing() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert_eq!(installed_state(&missing, &names()), InstalledState::Absent);
    }

    #[cfg(unix)]
    fn script(dir: &Path, name: &str, body: &str) {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn test_version_from_stderr() {
        let dir = TempDir::new().unwrap();
        script(dir.path(), "llama-cli", "echo 'version: 7400 (a1b2c3d)' >&2");
        assert_eq!(
            installed_state(dir.path(), &names()),
            InstalledState::Version(7400)
        );
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn test_falls_back_to_second_executable() {
        let dir = TempDir::new().unwrap();
        script(dir.path(), "llama-server", "echo 'version: 12 (ffff)'");
        assert_eq!(
            installed_state(dir.path(), &names()),
            InstalledState::Version(12)
        );
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn test_unparseable_output_is_unknown() {
        let dir = TempDir::new().unwrap();
        script(dir.path(), "llama-cli", "echo 'llama.cpp dev build'");
        assert_eq!(installed_state(dir.path(), &names()), InstalledState::Unknown);
    }

    #[cfg(unix)]
    #[test]
    #[serial]
    fn test_non_executable_is_unknown() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("llama-cli"), "not a program").unwrap();
        assert_eq!(installed_state(dir.path(), &names()), InstalledState::Unknown);
    }
}

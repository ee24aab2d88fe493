use crate::error::InstallError;
use std::process::Command;
use tracing::debug;

/// Read-only view of the host used by the profiler
pub trait SystemProbe {
    /// Kernel name as reported by `uname -s`
    fn kernel_name(&self) -> Result<String, InstallError>;

    /// Machine hardware name as reported by `uname -m`
    fn machine(&self) -> Result<String, InstallError>;

    /// Distribution id, if a distro identification tool is installed
    fn distro_id(&self) -> Option<String>;

    /// Whether an executable is reachable on `PATH`
    fn has_tool(&self, name: &str) -> bool;
}

/// Probe backed by the running system
#[derive(Debug, Default, Clone, Copy)]
pub struct RealProbe;

impl RealProbe {
    pub fn new() -> Self {
        Self
    }

    fn run(program: &str, args: &[&str]) -> Result<String, InstallError> {
        let command = format!("{} {}", program, args.join(" "));
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| InstallError::Probe {
                command: command.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(InstallError::Probe {
                command,
                message: format!("exited with {}", output.status),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!(command = %command, output = %stdout, "Probe result");
        Ok(stdout)
    }
}

impl SystemProbe for RealProbe {
    fn kernel_name(&self) -> Result<String, InstallError> {
        if cfg!(windows) {
            return Ok("Windows_NT".to_string());
        }
        Self::run("uname", &["-s"])
    }

    fn machine(&self) -> Result<String, InstallError> {
        if cfg!(windows) {
            return Ok(std::env::var("PROCESSOR_ARCHITECTURE")
                .unwrap_or_else(|_| std::env::consts::ARCH.to_string()));
        }
        Self::run("uname", &["-m"])
    }

    fn distro_id(&self) -> Option<String> {
        if !self.has_tool("lsb_release") {
            return None;
        }
        Self::run("lsb_release", &["-is"]).ok()
    }

    fn has_tool(&self, name: &str) -> bool {
        which::which(name).is_ok()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_real_probe_reports_kernel_and_machine() {
        let probe = RealProbe::new();
        assert!(!probe.kernel_name().unwrap().is_empty());
        assert!(!probe.machine().unwrap().is_empty());
    }

    #[test]
    fn test_has_tool() {
        let probe = RealProbe::new();
        assert!(probe.has_tool("sh"));
        assert!(!probe.has_tool("definitely-not-a-real-tool-llamaup"));
    }
}

//! Host profiling
//!
//! Maps kernel name, machine architecture and the presence of vendor GPU
//! tools to a [`HostProfile`]. Probing is behind [`SystemProbe`] so the
//! mapping itself stays a pure function.

mod probe;

pub use probe::{RealProbe, SystemProbe};

use crate::error::InstallError;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// Operating system family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Os {
    Ubuntu,
    #[serde(rename = "macos")]
    MacOs,
    Windows,
    LinuxGeneric,
}

impl Os {
    /// Tag used in release asset names
    pub fn asset_tag(&self) -> &'static str {
        match self {
            Os::Ubuntu | Os::LinuxGeneric => "ubuntu",
            Os::MacOs => "macos",
            Os::Windows => "win",
        }
    }

    /// Archive extension published for this OS
    pub fn archive_extension(&self) -> &'static str {
        match self {
            Os::Windows => ".zip",
            _ => ".tar.gz",
        }
    }

    pub fn executable_suffix(&self) -> &'static str {
        match self {
            Os::Windows => ".exe",
            _ => "",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Os::Ubuntu => write!(f, "ubuntu"),
            Os::MacOs => write!(f, "macos"),
            Os::Windows => write!(f, "windows"),
            Os::LinuxGeneric => write!(f, "linux-generic"),
        }
    }
}

/// CPU architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    X64,
    Arm64,
    S390x,
}

impl Arch {
    pub fn asset_tag(&self) -> &'static str {
        match self {
            Arch::X64 => "x64",
            Arch::Arm64 => "arm64",
            Arch::S390x => "s390x",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.asset_tag())
    }
}

/// GPU capability, at most one per host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gpu {
    Cuda,
    Hip,
    Vulkan,
    Metal,
    Cpu,
}

impl fmt::Display for Gpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gpu::Cuda => write!(f, "cuda"),
            Gpu::Hip => write!(f, "hip"),
            Gpu::Vulkan => write!(f, "vulkan"),
            Gpu::Metal => write!(f, "metal"),
            Gpu::Cpu => write!(f, "cpu"),
        }
    }
}

/// Detected OS/architecture/GPU combination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HostProfile {
    pub os: Os,
    pub arch: Arch,
    pub gpu: Gpu,
}

impl HostProfile {
    pub fn new(os: Os, arch: Arch, gpu: Gpu) -> Self {
        Self { os, arch, gpu }
    }
}

impl fmt::Display for HostProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.os, self.arch, self.gpu)
    }
}

/// Tools whose presence signals a GPU stack, in priority order
const GPU_TOOLS: &[(&[&str], Gpu)] = &[
    (&["nvidia-smi"], Gpu::Cuda),
    (&["rocminfo", "rocm-smi"], Gpu::Hip),
    (&["vulkaninfo"], Gpu::Vulkan),
];

/// Builds the host profile; unsupported OS or architecture aborts the run
pub fn detect_profile(probe: &dyn SystemProbe) -> Result<HostProfile, InstallError> {
    let kernel = probe.kernel_name()?;
    let os = map_os(&kernel, || probe.distro_id())?;

    let machine = probe.machine()?;
    let arch = map_arch(&machine)?;

    let gpu = detect_gpu(os, |tool| probe.has_tool(tool));

    let profile = HostProfile::new(os, arch, gpu);
    info!(
        os = %profile.os,
        arch = %profile.arch,
        gpu = %profile.gpu,
        "Host profile detected"
    );
    Ok(profile)
}

/// Maps a kernel name; `distro` is only consulted on Linux
pub fn map_os<F>(kernel: &str, distro: F) -> Result<Os, InstallError>
where
    F: FnOnce() -> Option<String>,
{
    let kernel = kernel.trim();
    if kernel == "Linux" {
        let distro = distro();
        debug!(distro = ?distro, "Linux distribution");
        return Ok(match distro {
            Some(id) if id.trim().eq_ignore_ascii_case("ubuntu") => Os::Ubuntu,
            _ => Os::LinuxGeneric,
        });
    }

    if kernel == "Darwin" {
        return Ok(Os::MacOs);
    }

    let upper = kernel.to_ascii_uppercase();
    if upper.starts_with("MINGW")
        || upper.starts_with("MSYS")
        || upper.starts_with("CYGWIN")
        || upper == "WINDOWS_NT"
    {
        return Ok(Os::Windows);
    }

    Err(InstallError::UnsupportedOs(kernel.to_string()))
}

pub fn map_arch(machine: &str) -> Result<Arch, InstallError> {
    match machine.trim() {
        "x86_64" | "amd64" | "AMD64" => Ok(Arch::X64),
        "aarch64" | "arm64" | "ARM64" => Ok(Arch::Arm64),
        "s390x" => Ok(Arch::S390x),
        other => Err(InstallError::UnsupportedArch(other.to_string())),
    }
}

/// First tool found wins; no capability combination
pub fn detect_gpu<F>(os: Os, has_tool: F) -> Gpu
where
    F: Fn(&str) -> bool,
{
    for (tools, gpu) in GPU_TOOLS {
        if let Some(tool) = tools.iter().find(|tool| has_tool(tool)) {
            debug!(tool, gpu = %gpu, "GPU tool found");
            return *gpu;
        }
    }

    match os {
        Os::MacOs => Gpu::Metal,
        _ => Gpu::Cpu,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    struct FakeProbe {
        kernel: &'static str,
        machine: &'static str,
        distro: Option<&'static str>,
        tools: Vec<&'static str>,
    }

    impl SystemProbe for FakeProbe {
        fn kernel_name(&self) -> Result<String, InstallError> {
            Ok(self.kernel.to_string())
        }

        fn machine(&self) -> Result<String, InstallError> {
            Ok(self.machine.to_string())
        }

        fn distro_id(&self) -> Option<String> {
            self.distro.map(str::to_string)
        }

        fn has_tool(&self, name: &str) -> bool {
            self.tools.contains(&name)
        }
    }

    #[parameterized(
        ubuntu = { "Linux", Some("Ubuntu"), Os::Ubuntu },
        fedora = { "Linux", Some("Fedora"), Os::LinuxGeneric },
        no_lsb = { "Linux", None, Os::LinuxGeneric },
        darwin = { "Darwin", None, Os::MacOs },
        mingw = { "MINGW64_NT-10.0-19045", None, Os::Windows },
        msys = { "MSYS_NT-10.0", None, Os::Windows },
        cygwin = { "CYGWIN_NT-10.0", None, Os::Windows },
        windows_nt = { "Windows_NT", None, Os::Windows },
    )]
    fn test_map_os(kernel: &str, distro: Option<&str>, expected: Os) {
        let os = map_os(kernel, || distro.map(str::to_string)).unwrap();
        assert_eq!(os, expected);
    }

    #[test]
    fn test_map_os_unsupported() {
        let err = map_os("FreeBSD", || None).unwrap_err();
        assert!(matches!(err, InstallError::UnsupportedOs(ref k) if k == "FreeBSD"));
    }

    #[test]
    fn test_distro_not_consulted_off_linux() {
        let os = map_os("Darwin", || panic!("distro probed on macOS")).unwrap();
        assert_eq!(os, Os::MacOs);
    }

    #[parameterized(
        x86_64 = { "x86_64", Arch::X64 },
        amd64 = { "amd64", Arch::X64 },
        aarch64 = { "aarch64", Arch::Arm64 },
        arm64 = { "arm64", Arch::Arm64 },
        s390x = { "s390x", Arch::S390x },
    )]
    fn test_map_arch(machine: &str, expected: Arch) {
        assert_eq!(map_arch(machine).unwrap(), expected);
    }

    #[test]
    fn test_map_arch_unsupported() {
        assert!(matches!(
            map_arch("riscv64"),
            Err(InstallError::UnsupportedArch(_))
        ));
    }

    #[test]
    fn test_gpu_priority() {
        let all = |_: &str| true;
        assert_eq!(detect_gpu(Os::Ubuntu, all), Gpu::Cuda);

        let rocm_and_vulkan = |tool: &str| tool == "rocm-smi" || tool == "vulkaninfo";
        assert_eq!(detect_gpu(Os::Ubuntu, rocm_and_vulkan), Gpu::Hip);

        let vulkan = |tool: &str| tool == "vulkaninfo";
        assert_eq!(detect_gpu(Os::LinuxGeneric, vulkan), Gpu::Vulkan);
    }

    #[test]
    fn test_gpu_platform_default() {
        let none = |_: &str| false;
        assert_eq!(detect_gpu(Os::MacOs, none), Gpu::Metal);
        assert_eq!(detect_gpu(Os::Ubuntu, none), Gpu::Cpu);
        assert_eq!(detect_gpu(Os::Windows, none), Gpu::Cpu);
    }

    #[test]
    fn test_detect_profile() {
        let probe = FakeProbe {
            kernel: "Linux",
            machine: "x86_64",
            distro: Some("Ubuntu"),
            tools: vec!["nvidia-smi"],
        };
        let profile = detect_profile(&probe).unwrap();
        assert_eq!(profile, HostProfile::new(Os::Ubuntu, Arch::X64, Gpu::Cuda));
        assert_eq!(profile.to_string(), "ubuntu-x64-cuda");
    }

    #[test]
    fn test_detect_profile_unsupported_arch_is_fatal() {
        let probe = FakeProbe {
            kernel: "Linux",
            machine: "ppc64le",
            distro: None,
            tools: vec![],
        };
        assert!(matches!(
            detect_profile(&probe),
            Err(InstallError::UnsupportedArch(_))
        ));
    }

    #[test]
    fn test_asset_tags() {
        assert_eq!(Os::LinuxGeneric.asset_tag(), "ubuntu");
        assert_eq!(Os::Windows.asset_tag(), "win");
        assert_eq!(Os::Windows.archive_extension(), ".zip");
        assert_eq!(Os::MacOs.archive_extension(), ".tar.gz");
    }

    #[test]
    fn test_profile_serializes() {
        let profile = HostProfile::new(Os::LinuxGeneric, Arch::Arm64, Gpu::Vulkan);
        let json = serde_json::to_value(profile).unwrap();
        assert_eq!(json["os"], "linux-generic");
        assert_eq!(json["arch"], "arm64");
        assert_eq!(json["gpu"], "vulkan");
    }

    #[test]
    fn test_os_serializes_like_display() {
        for os in [Os::Ubuntu, Os::MacOs, Os::Windows, Os::LinuxGeneric] {
            assert_eq!(serde_json::to_value(os).unwrap(), os.to_string());
        }
    }
}

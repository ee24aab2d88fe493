//! Download, verification and extraction of a selected archive

mod archive;
mod installed;

pub use archive::{extract_executables, ArchiveKind};
pub use installed::installed_state;

use crate::error::{InstallError, InstallWarning};
use crate::profile::Os;
use crate::release::Digest;
use std::path::Path;
use tracing::{debug, warn};

/// Executables copied out of every release archive
pub const EXECUTABLES: &[&str] = &["llama-cli", "llama-server"];

/// Executable file names for `os`
pub fn executable_names(os: Os) -> Vec<String> {
    EXECUTABLES
        .iter()
        .map(|name| format!("{}{}", name, os.executable_suffix()))
        .collect()
}

/// Checks a downloaded archive against the published digest
///
/// A missing digest only produces a warning; a mismatch or an algorithm we
/// cannot compute is fatal.
pub fn verify_archive(
    path: &Path,
    asset_name: &str,
    expected: Option<&str>,
) -> Result<Option<InstallWarning>, InstallError> {
    let Some(expected) = expected else {
        let warning = InstallWarning::MissingDigest {
            asset: asset_name.to_string(),
        };
        warn!("{}", warning);
        return Ok(Some(warning));
    };

    let expected = Digest::parse(expected)?;
    let actual = expected.compute_for(path)?;

    if actual != expected {
        return Err(InstallError::DigestMismatch {
            asset: asset_name.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        });
    }

    debug!(asset = asset_name, digest = %actual, "Checksum verified");
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::sha256_file;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn archive_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"archive bytes").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_executable_names() {
        assert_eq!(executable_names(Os::Ubuntu), vec!["llama-cli", "llama-server"]);
        assert_eq!(
            executable_names(Os::Windows),
            vec!["llama-cli.exe", "llama-server.exe"]
        );
    }

    #[test]
    fn test_verify_matching_digest() {
        let file = archive_file();
        let digest = sha256_file(file.path()).unwrap().to_string();
        let result = verify_archive(file.path(), "a.tar.gz", Some(&digest)).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_verify_uppercase_digest() {
        let file = archive_file();
        let digest = sha256_file(file.path()).unwrap();
        let published = format!("SHA256:{}", digest.hash().to_uppercase());
        assert!(verify_archive(file.path(), "a.tar.gz", Some(&published)).is_ok());
    }

    #[test]
    fn test_verify_mismatch() {
        let file = archive_file();
        let wrong = format!("sha256:{}", "0".repeat(64));
        let err = verify_archive(file.path(), "a.tar.gz", Some(&wrong)).unwrap_err();
        match err {
            InstallError::DigestMismatch { asset, expected, .. } => {
                assert_eq!(asset, "a.tar.gz");
                assert_eq!(expected, wrong);
            }
            other => panic!("Expected DigestMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_verify_missing_digest_warns() {
        let file = archive_file();
        let warning = verify_archive(file.path(), "a.tar.gz", None).unwrap();
        assert_eq!(
            warning,
            Some(InstallWarning::MissingDigest {
                asset: "a.tar.gz".to_string()
            })
        );
    }
}

use crate::error::InstallError;
use sha2::{Digest as _, Sha256};
use std::fs::File;
use std::io;
use std::path::Path;

/// Content digest in `algorithm:hash` form, as published by the releases API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    algorithm: String,
    hash: String,
}

impl Digest {
    /// Parse a digest string in format "algorithm:hash"
    pub fn parse(digest: &str) -> Result<Self, InstallError> {
        let (algorithm, hash) = digest
            .split_once(':')
            .ok_or_else(|| InstallError::UnsupportedDigest(digest.to_string()))?;

        if algorithm.is_empty() || hash.is_empty() {
            return Err(InstallError::UnsupportedDigest(digest.to_string()));
        }

        Ok(Self {
            algorithm: algorithm.to_ascii_lowercase(),
            hash: hash.to_ascii_lowercase(),
        })
    }

    pub fn sha256(hash: impl Into<String>) -> Self {
        Self {
            algorithm: "sha256".to_string(),
            hash: hash.into().to_ascii_lowercase(),
        }
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Hashes a file with this digest's algorithm
    pub fn compute_for(&self, path: &Path) -> Result<Digest, InstallError> {
        match self.algorithm.as_str() {
            "sha256" => sha256_file(path),
            _ => Err(InstallError::UnsupportedDigest(self.to_string())),
        }
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.hash)
    }
}

pub fn sha256_file(path: &Path) -> Result<Digest, InstallError> {
    let mut file = File::open(path).map_err(|e| InstallError::io(path, e))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(|e| InstallError::io(path, e))?;
    Ok(Digest::sha256(hex::encode(hasher.finalize())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_valid_digest() {
        let digest = Digest::parse("sha256:ABC123").unwrap();
        assert_eq!(digest.algorithm(), "sha256");
        assert_eq!(digest.hash(), "abc123");
        assert_eq!(digest.to_string(), "sha256:abc123");
    }

    #[test]
    fn test_parse_invalid_digest() {
        assert!(Digest::parse("invalid").is_err());
        assert!(Digest::parse("").is_err());
        assert!(Digest::parse("sha256:").is_err());
    }

    #[test]
    fn test_sha256_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"hello world").unwrap();
        file.flush().unwrap();

        let digest = sha256_file(file.path()).unwrap();
        assert_eq!(
            digest.hash(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_unsupported_algorithm() {
        let file = NamedTempFile::new().unwrap();
        let digest = Digest::parse("md5:d41d8cd98f00b204e9800998ecf8427e").unwrap();
        assert!(matches!(
            digest.compute_for(file.path()),
            Err(InstallError::UnsupportedDigest(_))
        ));
    }
}

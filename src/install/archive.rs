use crate::error::InstallError;
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Archive formats releases are published in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    TarGz,
    Zip,
}

impl ArchiveKind {
    /// Infers the format from the asset name
    pub fn from_name(name: &str) -> Result<Self, InstallError> {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
            Ok(ArchiveKind::TarGz)
        } else if lower.ends_with(".zip") {
            Ok(ArchiveKind::Zip)
        } else {
            Err(InstallError::UnsupportedArchive(name.to_string()))
        }
    }
}

/// Copies the entries whose file name is in `wanted` into `dest_dir`
///
/// Nested directories inside the archive are ignored; only the final path
/// component is compared. Each file lands through a temp file in `dest_dir`
/// and is renamed into place, so an interrupted run never leaves a truncated
/// executable behind. Returns the installed paths in `wanted` order.
pub fn extract_executables(
    archive: &Path,
    kind: ArchiveKind,
    wanted: &[String],
    dest_dir: &Path,
) -> Result<Vec<PathBuf>, InstallError> {
    fs::create_dir_all(dest_dir).map_err(|e| InstallError::io(dest_dir, e))?;

    let mut found: Vec<(String, PathBuf)> = Vec::new();
    let mut accept = |name: &str, reader: &mut dyn Read| -> Result<(), InstallError> {
        if !wanted.iter().any(|w| w == name) || found.iter().any(|(n, _)| n == name) {
            return Ok(());
        }
        let path = write_executable(reader, dest_dir, name)?;
        debug!(file = %path.display(), "Extracted executable");
        found.push((name.to_string(), path));
        Ok(())
    };

    match kind {
        ArchiveKind::TarGz => walk_tar_gz(archive, &mut accept)?,
        ArchiveKind::Zip => walk_zip(archive, &mut accept)?,
    }

    Ok(wanted
        .iter()
        .filter_map(|w| found.iter().find(|(n, _)| n == w).map(|(_, p)| p.clone()))
        .collect())
}

type EntryVisitor<'a> = dyn FnMut(&str, &mut dyn Read) -> Result<(), InstallError> + 'a;

fn walk_tar_gz(path: &Path, visit: &mut EntryVisitor<'_>) -> Result<(), InstallError> {
    let archive_err = |message: String| InstallError::Archive {
        path: path.to_path_buf(),
        message,
    };

    let file = File::open(path).map_err(|e| InstallError::io(path, e))?;
    let mut archive = tar::Archive::new(GzDecoder::new(file));

    let entries = archive
        .entries()
        .map_err(|e| archive_err(format!("invalid tar.gz: {}", e)))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| archive_err(format!("bad tar entry: {}", e)))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }

        let name = match entry
            .path()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        {
            Some(name) => name,
            None => continue,
        };

        visit(&name, &mut entry)?;
    }

    Ok(())
}

fn walk_zip(path: &Path, visit: &mut EntryVisitor<'_>) -> Result<(), InstallError> {
    let archive_err = |message: String| InstallError::Archive {
        path: path.to_path_buf(),
        message,
    };

    let file = File::open(path).map_err(|e| InstallError::io(path, e))?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| archive_err(format!("invalid zip: {}", e)))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| archive_err(format!("bad zip entry: {}", e)))?;
        if entry.is_dir() {
            continue;
        }

        let name = match entry
            .enclosed_name()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        {
            Some(name) => name,
            None => continue,
        };

        visit(&name, &mut entry)?;
    }

    Ok(())
}

fn write_executable(
    reader: &mut dyn Read,
    dest_dir: &Path,
    name: &str,
) -> Result<PathBuf, InstallError> {
    let target = dest_dir.join(name);

    let mut tmp = NamedTempFile::new_in(dest_dir).map_err(|e| InstallError::io(dest_dir, e))?;
    io::copy(reader, tmp.as_file_mut()).map_err(|e| InstallError::io(tmp.path(), e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(tmp.path(), fs::Permissions::from_mode(0o755))
            .map_err(|e| InstallError::io(tmp.path(), e))?;
    }

    tmp.persist(&target)
        .map_err(|e| InstallError::io(&target, e.error))?;

    Ok(target)
}

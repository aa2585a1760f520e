//! In-memory archive reading

use flate2::read::GzDecoder;
use provaudit_errors::{AuditError, Error};
use provaudit_types::Channel;
use std::io::{Cursor, Read};
use tar::Archive as TarArchive;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const ZIP_EMPTY_MAGIC: &[u8] = b"PK\x05\x06";
const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];

/// Container formats the auditor can read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// Wheels and hosting-service tag exports
    Zip,
    /// Source distributions
    TarGz,
}

impl ArchiveFormat {
    /// Detect the container format from leading magic bytes
    #[must_use]
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(ZIP_EMPTY_MAGIC) {
            Some(Self::Zip)
        } else if bytes.starts_with(GZIP_MAGIC) {
            Some(Self::TarGz)
        } else {
            None
        }
    }
}

/// A regular file read out of an archive, path as stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub path: String,
    pub data: Vec<u8>,
}

/// Read every regular file entry of an archive held in memory
///
/// Directory entries (and, for tarballs, links and other special entries)
/// are skipped.
///
/// # Errors
///
/// Returns `AuditError::ArchiveCorrupt` if the format is not recognized or
/// the container cannot be read.
pub fn read_entries(bytes: &[u8], version: &str, channel: Channel) -> Result<Vec<ArchiveEntry>, Error> {
    let corrupt = |message: String| -> Error {
        AuditError::ArchiveCorrupt {
            version: version.to_string(),
            channel: channel.to_string(),
            message,
        }
        .into()
    };

    match ArchiveFormat::detect(bytes) {
        Some(ArchiveFormat::Zip) => read_zip(bytes).map_err(corrupt),
        Some(ArchiveFormat::TarGz) => read_tar_gz(bytes).map_err(corrupt),
        None => Err(corrupt(format!(
            "unrecognized archive format ({} bytes)",
            bytes.len()
        ))),
    }
}

fn read_zip(bytes: &[u8]) -> Result<Vec<ArchiveEntry>, String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| format!("failed to read zip archive: {e}"))?;

    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| format!("failed to read zip entry: {e}"))?;

        if file.is_dir() {
            continue;
        }

        let path = file.name().to_string();
        let mut data = Vec::new();
        file.read_to_end(&mut data)
            .map_err(|e| format!("failed to read {path}: {e}"))?;

        entries.push(ArchiveEntry { path, data });
    }

    Ok(entries)
}

fn read_tar_gz(bytes: &[u8]) -> Result<Vec<ArchiveEntry>, String> {
    let mut archive = TarArchive::new(GzDecoder::new(bytes));

    let mut entries = Vec::new();
    for entry in archive
        .entries()
        .map_err(|e| format!("failed to read tarball: {e}"))?
    {
        let mut entry = entry.map_err(|e| format!("failed to read tar entry: {e}"))?;

        if !entry.header().entry_type().is_file() {
            continue;
        }

        let path = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        let mut data = Vec::new();
        entry
            .read_to_end(&mut data)
            .map_err(|e| format!("failed to read {path}: {e}"))?;

        entries.push(ArchiveEntry { path, data });
    }

    Ok(entries)
}

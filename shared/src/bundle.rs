//! `.jsdos` bundle archives.
//!
//! A bundle is a plain zip archive holding the game files plus a `.jsdos/`
//! directory with the DOSBox configuration and the bundle metadata the
//! emulator runtime reads before booting. Nothing here interprets those two
//! files; tooling only checks that they are present.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Bundle file extension without the dot.
pub const BUNDLE_EXTENSION: &str = "jsdos";

/// DOSBox configuration entry.
pub const DOSBOX_CONF_ENTRY: &str = ".jsdos/dosbox.conf";

/// Bundle metadata entry.
pub const JSDOS_JSON_ENTRY: &str = ".jsdos/jsdos.json";

/// Entries every bundle must contain.
pub const REQUIRED_ENTRIES: [&str; 2] = [DOSBOX_CONF_ENTRY, JSDOS_JSON_ENTRY];

/// Maximum bundle size accepted for inspection or extraction.
pub const MAX_BUNDLE_BYTES: u64 = 512 * 1024 * 1024; // 512 MiB

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not a readable zip archive: {source}", .path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("{} is too large ({len} bytes, max {max} bytes)", .path.display())]
    TooLarge { path: PathBuf, len: u64, max: u64 },

    #[error("{} is missing: {}", .path.display(), .missing.join(", "))]
    MissingEntries {
        path: PathBuf,
        missing: Vec<&'static str>,
    },
}

impl BundleError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn archive(path: &Path, source: zip::result::ZipError) -> Self {
        Self::Archive {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result of looking inside a bundle.
#[derive(Debug, Clone)]
pub struct BundleReport {
    pub path: PathBuf,
    /// File entries (directories excluded), sorted.
    pub entries: BTreeSet<String>,
    /// Required entries that are absent, in [`REQUIRED_ENTRIES`] order.
    pub missing: Vec<&'static str>,
}

impl BundleReport {
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty()
    }

    /// Convert a report with missing entries into an error.
    pub fn into_result(self) -> Result<Self, BundleError> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(BundleError::MissingEntries {
                path: self.path,
                missing: self.missing,
            })
        }
    }
}

/// Returns true if `path` carries the bundle extension.
pub fn has_bundle_extension(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(BUNDLE_EXTENSION)
}

fn open_archive(path: &Path) -> Result<ZipArchive<BufReader<File>>, BundleError> {
    let len = std::fs::metadata(path)
        .map_err(|e| BundleError::io(path, e))?
        .len();
    if len > MAX_BUNDLE_BYTES {
        return Err(BundleError::TooLarge {
            path: path.to_path_buf(),
            len,
            max: MAX_BUNDLE_BYTES,
        });
    }

    let file = File::open(path).map_err(|e| BundleError::io(path, e))?;
    ZipArchive::new(BufReader::new(file)).map_err(|e| BundleError::archive(path, e))
}

/// List a bundle's file entries and check for the required ones.
pub fn inspect_bundle(path: &Path) -> Result<BundleReport, BundleError> {
    let archive = open_archive(path)?;

    let entries: BTreeSet<String> = archive
        .file_names()
        .filter(|name| !name.ends_with('/'))
        .map(str::to_owned)
        .collect();

    let missing = REQUIRED_ENTRIES
        .iter()
        .copied()
        .filter(|required| !entries.contains(*required))
        .collect();

    Ok(BundleReport {
        path: path.to_path_buf(),
        entries,
        missing,
    })
}

/// Pack every file under `src_dir` into a bundle at `dest`.
///
/// Entries are written in sorted order with a fixed timestamp, so packing
/// the same tree twice yields the same archive. Returns the number of files
/// written.
pub fn write_bundle(src_dir: &Path, dest: &Path) -> Result<usize, BundleError> {
    let file = File::create(dest).map_err(|e| BundleError::io(dest, e))?;
    let mut writer = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default())
        .unix_permissions(0o644);

    let mut written = 0;
    for entry in WalkDir::new(src_dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src_dir).to_path_buf();
            BundleError::Io {
                path,
                source: e.into(),
            }
        })?;

        // strip_prefix cannot fail for entries yielded under src_dir.
        let Ok(relative) = entry.path().strip_prefix(src_dir) else {
            continue;
        };
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if entry.file_type().is_dir() {
            writer
                .add_directory(format!("{name}/"), options)
                .map_err(|e| BundleError::archive(dest, e))?;
        } else {
            writer
                .start_file(name, options)
                .map_err(|e| BundleError::archive(dest, e))?;
            let mut input = File::open(entry.path()).map_err(|e| BundleError::io(entry.path(), e))?;
            io::copy(&mut input, &mut writer).map_err(|e| BundleError::io(dest, e))?;
            written += 1;
        }
    }

    writer.finish().map_err(|e| BundleError::archive(dest, e))?;
    tracing::debug!("Packed {} files into {}", written, dest.display());
    Ok(written)
}

/// Unpack a bundle into `dest`, refusing bundles without the required entries.
pub fn extract_bundle(path: &Path, dest: &Path) -> Result<BundleReport, BundleError> {
    let report = inspect_bundle(path)?.into_result()?;
    extract_archive(path, dest)?;
    Ok(report)
}

/// Unpack any zip archive into `dest` (e.g. a game's download before it is
/// bundled). Returns the number of entries.
pub fn extract_archive(path: &Path, dest: &Path) -> Result<usize, BundleError> {
    std::fs::create_dir_all(dest).map_err(|e| BundleError::io(dest, e))?;
    let mut archive = open_archive(path)?;
    let len = archive.len();
    archive
        .extract(dest)
        .map_err(|e| BundleError::archive(path, e))?;

    tracing::debug!("Extracted {} into {}", path.display(), dest.display());
    Ok(len)
}

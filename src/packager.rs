//! Output collection and packaging.
//!
//! After yt-dlp finishes, the workspace is scanned for produced MP3s. A
//! single file is handed back as-is; several are bundled into one zip
//! archive so the form always delivers exactly one download.

use crate::error::{HentError, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Extension produced by the audio postprocessor.
const OUTPUT_EXTENSION: &str = ".mp3";

/// Archive name used when a request yields several files.
const ARCHIVE_NAME: &str = "downloads.zip";

/// The deliverable for one request: a file on disk plus its status line.
#[derive(Debug, Clone, PartialEq)]
pub struct Packaged {
    pub file: PathBuf,
    pub status: String,
}

/// Lists produced audio files in `dir`, sorted by path for stable ordering.
pub fn collect_outputs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if name.to_string_lossy().to_lowercase().ends_with(OUTPUT_EXTENSION) {
            files.push(entry.path());
        }
    }

    files.sort();
    Ok(files)
}

/// Returns a single file directly, or bundles several into one archive.
pub fn package(dir: &Path, files: &[PathBuf]) -> Result<Packaged> {
    if files.is_empty() {
        return Err(HentError::NoFilesDownloaded);
    }

    if files.len() == 1 {
        return Ok(Packaged {
            file: files[0].clone(),
            status: "Downloaded 1 file.".to_string(),
        });
    }

    let zip_path = dir.join(ARCHIVE_NAME);
    let archive = fs::File::create(&zip_path)?;
    let mut writer = ZipWriter::new(archive);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for file in files {
        // Entries are stored flat under their base names.
        let name = file
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                HentError::Archive(format!("unrepresentable file name: {}", file.display()))
            })?;

        writer
            .start_file(name, options)
            .map_err(|e| HentError::Archive(e.to_string()))?;
        let mut source = fs::File::open(file)?;
        io::copy(&mut source, &mut writer)?;
    }

    writer
        .finish()
        .map_err(|e| HentError::Archive(e.to_string()))?;

    Ok(Packaged {
        file: zip_path,
        status: format!("Downloaded {} files (zipped).", files.len()),
    })
}

use crate::batch::OutputFile;
use crate::constants::DEFAULT_ARCHIVE_NAME;
use crate::error::ArchiveError;
use std::collections::HashSet;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Packages converted files into a single container blob.
pub trait ArchiveWriter {
    fn write(&self, files: &[OutputFile]) -> Result<Vec<u8>, ArchiveError>;
}

/// ZIP container. Entries are stored as-is by default since the payloads
/// are already compressed images.
#[derive(Debug, Clone, Copy)]
pub struct ZipArchiveWriter {
    method: CompressionMethod,
}

impl Default for ZipArchiveWriter {
    fn default() -> Self {
        Self {
            method: CompressionMethod::Stored,
        }
    }
}

impl ZipArchiveWriter {
    pub fn deflated() -> Self {
        Self {
            method: CompressionMethod::Deflated,
        }
    }
}

impl ArchiveWriter for ZipArchiveWriter {
    fn write(&self, files: &[OutputFile]) -> Result<Vec<u8>, ArchiveError> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(self.method);

        for (file, entry_name) in files.iter().zip(unique_entry_names(files)) {
            debug!(entry = %entry_name, size = file.size(), "Adding archive entry");
            zip.start_file(entry_name, options)?;
            zip.write_all(&file.bytes)?;
        }

        Ok(zip.finish()?.into_inner())
    }
}

/// Entry names in file order, with repeats renamed `name-1.ext`, `name-2.ext`, ...
pub fn unique_entry_names(files: &[OutputFile]) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::with_capacity(files.len());
    let mut names = Vec::with_capacity(files.len());

    for file in files {
        let mut candidate = file.name.clone();
        let mut suffix = 1;
        while taken.contains(&candidate) {
            candidate = with_suffix(&file.name, suffix);
            suffix += 1;
        }
        taken.insert(candidate.clone());
        names.push(candidate);
    }

    names
}

fn with_suffix(name: &str, suffix: usize) -> String {
    match name.rfind('.') {
        Some(idx) if idx > 0 => format!("{}-{}{}", &name[..idx], suffix, &name[idx..]),
        _ => format!("{}-{}", name, suffix),
    }
}

/// A finished archive ready to be handed to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Archive {
    pub fn build(writer: &dyn ArchiveWriter, files: &[OutputFile]) -> Result<Self, ArchiveError> {
        Ok(Self {
            name: DEFAULT_ARCHIVE_NAME.to_string(),
            bytes: writer.write(files)?,
        })
    }

    /// Writes the archive into `dir` under its name, replacing any existing file.
    ///
    /// The bytes go to a temporary file in the same directory first, so a
    /// failed write never leaves a truncated archive behind.
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf, ArchiveError> {
        fs::create_dir_all(dir)?;
        let destination = dir.join(&self.name);

        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(&self.bytes)?;
        temp.as_file().sync_all()?;
        temp.persist(&destination)?;

        Ok(destination)
    }
}

//! File selection boundary: turns command-line inputs into [`InputFile`]s.
//!
//! Inputs may be files, directories or glob patterns. Every regular file
//! found is read and given a content type declared from its extension;
//! anything not declared as `image/*` is dropped without comment.

use crate::batch::InputFile;
use crate::error::{CompressionError, Result};
use crate::formats::{content_type_for_path, is_image_content_type};
use glob::glob;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Expands inputs into candidate file paths, in the order given.
/// Directory contents are sorted by file name; hidden entries are skipped.
pub fn collect_candidate_paths(inputs: &[String], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for input in inputs {
        let input_path = Path::new(input);

        if input_path.is_file() {
            paths.push(input_path.to_path_buf());
        } else if input_path.is_dir() {
            let walker = if recursive {
                WalkDir::new(input_path)
            } else {
                WalkDir::new(input_path).max_depth(1)
            };

            for entry in walker
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()))
            {
                let entry = entry?;
                if entry.file_type().is_file() {
                    paths.push(entry.into_path());
                }
            }
        } else {
            // Not an existing path: treat it as a glob. No matches is not an error.
            for entry in glob(input)?.flatten() {
                if entry.is_file() {
                    paths.push(entry);
                }
            }
        }
    }

    Ok(paths)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// Reads a file into an [`InputFile`] named after its final path component.
pub fn read_input_file(path: &Path) -> Result<InputFile> {
    let bytes = fs::read(path).map_err(|source| CompressionError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());

    Ok(InputFile::with_declared_type(name, bytes))
}

/// Keeps only candidates whose declared content type is `image/*`.
pub fn select_images(candidates: Vec<InputFile>) -> Vec<InputFile> {
    candidates
        .into_iter()
        .filter(|file| {
            let keep = is_image_content_type(file.content_type());
            if !keep {
                debug!(file = %file.name(), content_type = %file.content_type(), "Skipping non-image");
            }
            keep
        })
        .collect()
}

/// Collects, reads and filters inputs in one step.
///
/// Only files that pass the `image/` filter are read from disk.
pub fn load_images(inputs: &[String], recursive: bool) -> Result<Vec<InputFile>> {
    collect_candidate_paths(inputs, recursive)?
        .into_iter()
        .filter(|path| is_image_content_type(content_type_for_path(path)))
        .map(|path| read_input_file(&path))
        .collect()
}

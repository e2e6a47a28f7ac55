// File utilities for the Voice & Search API
//
// This module contains utility functions for file operations used by the voice handler.
// It handles creating unique upload paths, writing uploads and removing them again.

use chrono::Local;
use log::{error, info};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// An uploaded file stored on disk for the duration of one request
///
/// The file is removed when the guard is dropped, whichever way the request ends.
#[derive(Debug)]
pub struct TempUpload {
    path: PathBuf,
    file_name: String,
    size: usize,
}

impl TempUpload {
    /// Creates a unique upload path under `base_dir` and writes `data` to it
    ///
    /// # Errors
    ///
    /// Returns an IO error if the directory cannot be created or the file cannot be written
    pub fn create(base_dir: &str, prefix: &str, extension: &str, data: &[u8]) -> io::Result<Self> {
        fs::create_dir_all(base_dir)?;

        let file_name = generate_upload_name(prefix, extension);
        let upload = Self {
            path: Path::new(base_dir).join(&file_name),
            file_name,
            size: data.len(),
        };

        // From here on the guard owns the path, so a failed write still cleans up
        save_file_data(data, &upload.path)?;
        Ok(upload)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Size of the stored upload in bytes
    pub fn size(&self) -> usize {
        self.size
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        cleanup_file(&self.path);
    }
}

/// Generate a unique, sanitized filename
///
/// The name carries a second-resolution timestamp for readability and a UUID for uniqueness,
/// e.g. `voice_20240131_174502_0b6e...c1.webm`.
pub fn generate_upload_name(prefix: &str, extension: &str) -> String {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    sanitize_filename(&format!(
        "{}_{}_{}.{}",
        prefix,
        timestamp,
        Uuid::new_v4(),
        extension
    ))
}

/// Reduce a filename to a safe, flat form
///
/// Path separators and whitespace become underscores, anything outside ASCII letters,
/// digits, `.`, `_` and `-` is dropped, and leading dots or underscores are stripped so
/// the result can never be hidden or escape the upload directory.
pub fn sanitize_filename(name: &str) -> String {
    let mapped: String = name
        .chars()
        .filter_map(|c| match c {
            '/' | '\\' => Some('_'),
            c if c.is_whitespace() => Some('_'),
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') => Some(c),
            _ => None,
        })
        .collect();

    mapped.trim_start_matches(&['.', '_'][..]).to_string()
}

/// Save uploaded file data to the filesystem
pub fn save_file_data(data: &[u8], file_path: &Path) -> io::Result<()> {
    let mut file = File::create(file_path)?;
    file.write_all(data)?;
    Ok(())
}

/// Remove a single file
///
/// This function logs errors but doesn't return them to the caller
pub fn cleanup_file(file_path: &Path) {
    match fs::remove_file(file_path) {
        Ok(()) => info!("Removed temporary file: {}", file_path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => error!("Failed to remove file {}: {}", file_path.display(), e),
    }
}

//! File reading and YAML document loading
//!
//! This module checks and reads YAML files from disk and parses their first
//! document into a position-aware tree.

use crate::core::Node;
use crate::error::{Result, YasakError};
use crate::io::parser::parse_document;
use log::debug;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Configuration for the YAML reader
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Maximum file size to read (in bytes)
    pub max_file_size: Option<u64>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_file_size: Some(10 * 1024 * 1024), // 10MB default limit
        }
    }
}

/// YAML file reader
#[derive(Debug, Clone, Default)]
pub struct YamlReader {
    config: ReaderConfig,
}

impl YamlReader {
    /// Create a new reader with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new reader with custom configuration
    pub fn with_config(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Fail unless `path` exists
    ///
    /// Existence is checked separately from reading so callers can report a
    /// missing file before validating anything else. Lookup failures other
    /// than a missing entry are reported as an unreadable file.
    pub fn ensure_exists<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        // symlink_metadata also accepts dangling links, which then fail on read
        match fs::symlink_metadata(path) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(YasakError::file_not_found(path)),
            Err(e) => Err(YasakError::unreadable(path, e)),
        }
    }

    /// Read the raw text of a YAML file
    pub fn read_to_string<P: AsRef<Path>>(&self, path: P) -> Result<String> {
        let path = path.as_ref();
        self.ensure_exists(path)?;

        if let Some(limit) = self.config.max_file_size {
            let metadata = fs::metadata(path).map_err(|e| YasakError::unreadable(path, e))?;
            if metadata.is_file() && metadata.len() > limit {
                return Err(YasakError::FileTooLarge {
                    path: path.to_path_buf(),
                    size: metadata.len(),
                    limit,
                });
            }
        }

        let content = fs::read_to_string(path).map_err(|e| YasakError::unreadable(path, e))?;
        debug!("read {} bytes from '{}'", content.len(), path.display());
        Ok(content)
    }

    /// Read and parse the first YAML document of a file
    pub fn read_file<P: AsRef<Path>>(&self, path: P) -> Result<Node> {
        let path = path.as_ref();
        let content = self.read_to_string(path)?;
        parse_document(&content)
            .map_err(|e| YasakError::invalid_yaml(path.display().to_string(), e))
    }
}

//! Error types for the yasak library
//!
//! This module gathers the errors of every stage of a lookup: reading the
//! file, tokenizing the path, parsing the YAML and resolving the path, and
//! maps them to the exit statuses of the command-line tool.

use crate::core::{PointerError, ResolveError};
use crate::io::parser::ParseError;
use std::path::PathBuf;
use thiserror::Error;

/// Where go-patch path syntax is documented
pub const PATH_SYNTAX_REFERENCE: &str =
    "https://github.com/cppforlife/go-patch/blob/master/docs/examples.md";

/// The main error type for all library operations
#[derive(Error, Debug)]
pub enum YasakError {
    /// I/O errors not tied to a specific input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The YAML file does not exist
    #[error("file does not exist: '{}'", .path.display())]
    FileNotFound { path: PathBuf },

    /// The YAML file exists but could not be read
    #[error("can't read file: '{}' ({source})", .path.display())]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The YAML file is larger than the reader accepts
    #[error("file too large: '{}' ({size} bytes, limit: {limit} bytes)", .path.display())]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    /// The path expression could not be tokenized
    #[error(
        "invalid path: '{path}' ({source}). Please consult <{}> for reference.",
        PATH_SYNTAX_REFERENCE
    )]
    InvalidPath { path: String, source: PointerError },

    /// The YAML content could not be parsed
    #[error("invalid YAML content in file: '{origin}' ({source})")]
    InvalidYaml { origin: String, source: ParseError },

    /// The path does not lead to a value in the document
    #[error(transparent)]
    Resolution(#[from] ResolveError),

    /// The location could not be rendered
    #[error("Output error: {reason}")]
    Output { reason: String },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, YasakError>;

impl YasakError {
    /// Create a new file not found error
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a new unreadable file error
    pub fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Unreadable {
            path: path.into(),
            source,
        }
    }

    /// Create a new invalid path error
    pub fn invalid_path(path: impl Into<String>, source: PointerError) -> Self {
        Self::InvalidPath {
            path: path.into(),
            source,
        }
    }

    /// Create a new invalid YAML error
    pub fn invalid_yaml(origin: impl Into<String>, source: ParseError) -> Self {
        Self::InvalidYaml {
            origin: origin.into(),
            source,
        }
    }

    /// Create a new output error
    pub fn output(reason: impl Into<String>) -> Self {
        Self::Output {
            reason: reason.into(),
        }
    }

    /// True when the value designated by the path could not be found
    ///
    /// These are the failures silent mode suppresses. Problems with the
    /// inputs themselves are always reported.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Resolution(_))
    }

    /// Process exit status for this error
    pub fn exit_code(&self) -> u8 {
        if self.is_not_found() {
            1
        } else {
            2
        }
    }
}

//! I/O operations for YAML documents
//!
//! This module handles:
//! - Parsing YAML text into position-aware trees
//! - Reading YAML files with existence and size checks
//! - Rendering located nodes for output

pub mod formatter;
pub mod parser;
pub mod reader;

pub use formatter::{render, Location, OutputFormat};
pub use parser::{parse_document, ParseError};
pub use reader::{ReaderConfig, YamlReader};

//! yasak: locate values in YAML files with go-patch paths
//!
//! This library resolves a go-patch style path such as
//! `/instance_groups/name=web/jobs/name=nginx/release` against a YAML
//! document and reports where the addressed value starts in the source
//! text, together with the comment that trails it on the same line.
//!
//! # Features
//!
//! - **Position-aware YAML trees** with 1-based lines and columns
//! - **go-patch paths** with keys, indexes, `key=value` matching and optional tokens
//! - **Typed errors** that explain what was expected and what was found
//!
//! # Quick Start
//!
//! ```rust
//! use yasak::{locate, Result};
//!
//! fn main() -> Result<()> {
//!     let yaml = "\
//! jobs:
//!   - name: nginx
//!     release: nginx  # pinned
//! ";
//!     let location = locate(yaml, "/jobs/name=nginx/release")?.unwrap();
//!     assert_eq!((location.line, location.column), (3, 14));
//!     assert_eq!(location.comment, "# pinned");
//!
//!     // Absent optional keys at the end of a path resolve to nothing
//!     assert!(locate(yaml, "/jobs/0/version?")?.is_none());
//!     Ok(())
//! }
//! ```
//!
//! ## Working with the tree directly
//!
//! ```rust
//! use yasak::core::{resolve, Pointer};
//! use yasak::io::parse_document;
//!
//! let root = parse_document("a:\n  - x\n  - y\n").unwrap();
//! let pointer = Pointer::parse("/a/-1").unwrap();
//! let node = resolve(&root, &pointer).unwrap().unwrap();
//! assert_eq!(node.scalar_value(), Some("y"));
//! ```

pub mod core;
pub mod error;
pub mod io;

// Re-export commonly used types for convenience
pub use crate::core::{resolve, Node, NodeKind, Pointer, Position, ResolveError, Token};
pub use error::{Result, YasakError};
pub use crate::io::{parse_document, Location, OutputFormat, ReaderConfig, YamlReader};

/// Origin reported for YAML that did not come from a file
const STRING_ORIGIN: &str = "<string>";

/// Locate the node addressed by `path` in YAML text
///
/// Returns `Ok(None)` when an optional key at the end of the path is absent.
pub fn locate(yaml: &str, path: &str) -> Result<Option<Location>> {
    let pointer = Pointer::parse(path).map_err(|e| YasakError::invalid_path(path, e))?;
    let root = parse_document(yaml).map_err(|e| YasakError::invalid_yaml(STRING_ORIGIN, e))?;
    locate_in(&root, &pointer)
}

/// Locate the node addressed by `pointer` in an already parsed document
pub fn locate_in(root: &Node, pointer: &Pointer) -> Result<Option<Location>> {
    let node = resolve(root, pointer)?;
    Ok(node.as_deref().map(Location::from))
}

/// Convenience functions for common file operations
pub mod convenience {
    use super::*;
    use std::path::Path;

    /// Locate the node addressed by `path` in a YAML file
    ///
    /// The path is validated before the file is read.
    pub fn locate_file<P: AsRef<Path>>(file: P, path: &str) -> Result<Option<Location>> {
        let file = file.as_ref();
        let reader = YamlReader::new();
        reader.ensure_exists(file)?;

        let pointer = Pointer::parse(path).map_err(|e| YasakError::invalid_path(path, e))?;
        let root = reader.read_file(file)?;
        locate_in(&root, &pointer)
    }
}

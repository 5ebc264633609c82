//! Rendering located nodes
//!
//! A lookup prints three fields: the 1-based line, the 1-based column and
//! the trailing comment of the located node. The default rendering joins
//! them with tabs; JSON output is available for tooling.

use crate::core::Node;
use crate::error::{Result, YasakError};
use serde::Serialize;
use std::fmt;

/// Where a node was found in its source text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    /// 1-based line, or -1 for a placeholder node
    pub line: i64,
    /// 1-based column, or -1 for a placeholder node
    pub column: i64,
    /// Comment trailing the node on its line, empty when there is none
    pub comment: String,
}

impl From<&Node> for Location {
    fn from(node: &Node) -> Self {
        Self {
            line: node.line(),
            column: node.column(),
            comment: node.trailing_comment().to_string(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.line, self.column, self.comment)
    }
}

/// How a location is written out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// `line<TAB>column<TAB>comment`
    #[default]
    Tab,
    /// A JSON object with `line`, `column` and `comment` fields
    Json,
}

/// Render a location followed by a newline
pub fn render(location: &Location, format: OutputFormat, pretty: bool) -> Result<String> {
    let body = match format {
        OutputFormat::Tab => location.to_string(),
        OutputFormat::Json if pretty => serde_json::to_string_pretty(location)
            .map_err(|e| YasakError::output(e.to_string()))?,
        OutputFormat::Json => {
            serde_json::to_string(location).map_err(|e| YasakError::output(e.to_string()))?
        }
    };
    Ok(format!("{}\n", body))
}

//! YAML parser that builds position-aware document trees
//!
//! The parser drives `yaml-rust2`'s event API and assembles a [`Node`] tree,
//! recording for each node the 1-based line and column where it starts and,
//! for scalars and flow collections, the comment that trails it on the same
//! line. Block mappings start at their first key and block sequences at
//! their first `-` indicator.

use crate::core::node::{Node, Position};
use log::trace;
use std::collections::HashMap;
use thiserror::Error;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::Marker;
use yaml_rust2::ScanError;

/// Errors produced while parsing YAML text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("{0}")]
    Syntax(String),

    #[error("no YAML document found")]
    EmptyDocument,

    #[error("alias refers to an unknown anchor")]
    UnknownAnchor,
}

impl From<ScanError> for ParseError {
    fn from(err: ScanError) -> Self {
        Self::Syntax(err.to_string())
    }
}

/// Parse the first document of a YAML stream
///
/// # Example
///
/// ```rust
/// use yasak::io::parser::parse_document;
///
/// let root = parse_document("title: My Document # main title").unwrap();
/// let title = root.get("title").unwrap();
/// assert_eq!((title.line(), title.column()), (1, 8));
/// assert_eq!(title.trailing_comment(), "# main title");
/// ```
pub fn parse_document(content: &str) -> Result<Node, ParseError> {
    let mut parser = Parser::new_from_str(content);
    let mut builder = TreeBuilder::new(content);

    parser.load(&mut builder, false)?;

    builder.result()
}

/// Character offsets of line starts, for turning markers into positions
struct SourceText {
    chars: Vec<char>,
    line_starts: Vec<usize>,
}

impl SourceText {
    fn new(content: &str) -> Self {
        let chars: Vec<char> = content.chars().collect();
        let line_starts = std::iter::once(0)
            .chain(
                chars
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| **c == '\n')
                    .map(|(i, _)| i + 1),
            )
            .collect();
        Self { chars, line_starts }
    }

    fn position(&self, index: usize) -> Position {
        let line = self.line_starts.partition_point(|start| *start <= index);
        let line_start = self.line_starts[line.saturating_sub(1)];
        Position::new(line as i64, (index - line_start) as i64 + 1)
    }

    fn char_at(&self, index: usize) -> Option<char> {
        self.chars.get(index).copied()
    }

    fn opens_flow(&self, index: usize) -> bool {
        matches!(self.char_at(index), Some('[') | Some('{'))
    }

    /// The `-` indicator of the block sequence entry whose content starts at `index`
    fn dash_before(&self, index: usize) -> Option<usize> {
        if self.char_at(index) == Some('-')
            && self.char_at(index + 1).map_or(true, char::is_whitespace)
        {
            return Some(index);
        }
        (0..index.min(self.chars.len()))
            .rev()
            .find(|i| !self.chars[*i].is_whitespace())
            .filter(|i| self.chars[*i] == '-')
    }

    /// The bracket closing the flow collection opened at `open`
    fn closing_bracket(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut quote: Option<char> = None;
        let mut prev = ' ';
        let mut i = open;

        while let Some(c) = self.char_at(i) {
            match quote {
                Some('"') if c == '\\' => i += 1,
                Some('\'') if c == '\'' && self.char_at(i + 1) == Some('\'') => i += 1,
                Some(q) if c == q => quote = None,
                Some(_) => {}
                None => match c {
                    '[' | '{' => depth += 1,
                    ']' | '}' => {
                        depth = depth.saturating_sub(1);
                        if depth == 0 {
                            return Some(i);
                        }
                    }
                    '"' | '\'' if prev.is_whitespace() || matches!(prev, '[' | '{' | ',' | ':') => {
                        quote = Some(c)
                    }
                    '#' if prev.is_whitespace() => {
                        i = self.line_end(i);
                        prev = '\n';
                        continue;
                    }
                    _ => {}
                },
            }
            prev = c;
            i += 1;
        }

        None
    }

    /// The `#` comment following the token that starts at `start`, on the same line
    ///
    /// Inside a flow collection the token ends at the next `,`, `]` or `}`,
    /// and a comment after that belongs to the collection.
    fn trailing_comment(&self, start: usize, in_flow: bool) -> String {
        let mut quote: Option<char> = None;
        let mut prev_blank = false;
        let mut i = start;

        while let Some(c) = self.char_at(i) {
            if c == '\n' || c == '\r' {
                break;
            }
            match quote {
                Some('"') if c == '\\' => i += 1,
                Some('\'') if c == '\'' && self.char_at(i + 1) == Some('\'') => i += 1,
                Some(q) if c == q => quote = None,
                Some(_) => {}
                None if in_flow && matches!(c, ',' | ']' | '}') => break,
                None if c == '#' && prev_blank => {
                    let end = self.line_end(i);
                    return trim_end(&self.chars[i..end]).iter().collect();
                }
                None if i == start && (c == '"' || c == '\'') => quote = Some(c),
                None => {}
            }
            prev_blank = c == ' ' || c == '\t';
            i += 1;
        }

        String::new()
    }

    fn line_end(&self, from: usize) -> usize {
        (from..self.chars.len())
            .find(|i| matches!(self.chars[*i], '\n' | '\r'))
            .unwrap_or(self.chars.len())
    }
}

fn trim_end(chars: &[char]) -> &[char] {
    let len = chars
        .iter()
        .rposition(|c| !c.is_whitespace())
        .map_or(0, |last| last + 1);
    &chars[..len]
}

/// A collection whose end event has not been seen yet
///
/// `start` is the marker of the start event: the opening bracket of a flow
/// collection, the first entry's content of a block sequence, or the first
/// `:` of a block mapping.
enum Pending {
    Sequence {
        start: usize,
        flow: bool,
        anchor: usize,
        items: Vec<Node>,
    },
    Mapping {
        start: usize,
        flow: bool,
        anchor: usize,
        entries: Vec<(Node, Option<Node>)>,
    },
}

impl Pending {
    fn is_flow(&self) -> bool {
        match self {
            Self::Sequence { flow, .. } | Self::Mapping { flow, .. } => *flow,
        }
    }
}

/// Receives parser events and assembles the node tree
struct TreeBuilder {
    source: SourceText,
    stack: Vec<Pending>,
    anchors: HashMap<usize, Node>,
    root: Option<Node>,
    error: Option<ParseError>,
}

impl TreeBuilder {
    fn new(content: &str) -> Self {
        Self {
            source: SourceText::new(content),
            stack: Vec::new(),
            anchors: HashMap::new(),
            root: None,
            error: None,
        }
    }

    fn result(self) -> Result<Node, ParseError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        self.root.ok_or(ParseError::EmptyDocument)
    }

    fn in_flow(&self) -> bool {
        self.stack.last().map_or(false, Pending::is_flow)
    }

    fn complete(&mut self, node: Node, anchor: usize) {
        if anchor != 0 {
            self.anchors.insert(anchor, node.clone());
        }

        match self.stack.last_mut() {
            None => {
                if self.root.is_none() {
                    self.root = Some(node);
                }
            }
            Some(Pending::Sequence { items, .. }) => items.push(node),
            Some(Pending::Mapping { entries, .. }) => match entries.last_mut() {
                Some((_, value @ None)) => *value = Some(node),
                _ => entries.push((node, None)),
            },
        }
    }

    /// Whether a collection starting at `start` is a flow collection
    ///
    /// A block sequence whose first entry is a flow collection shares that
    /// entry's start marker. When the entry arrives, the enclosing sequence
    /// is demoted to block.
    fn begin_collection(&mut self, start: usize) -> bool {
        if let Some(Pending::Sequence { start: outer, flow, .. }) = self.stack.last_mut() {
            if *outer == start && *flow {
                *flow = false;
                return true;
            }
        }
        self.in_flow() || self.source.opens_flow(start)
    }

    fn scalar(&self, value: String, marker: &Marker) -> Node {
        let index = marker.index();
        let position = self.source.position(index);
        // Empty values are reported as "~" at the next token.
        if value == "~" && self.source.char_at(index) != Some('~') {
            return Node::scalar("", position);
        }
        let comment = self.source.trailing_comment(index, self.in_flow());
        Node::scalar(value, position).with_trailing_comment(comment)
    }

    /// Attach the comment following the closing bracket of a flow collection
    fn flow_comment(&self, node: Node, open: usize) -> Node {
        let comment = self
            .source
            .closing_bracket(open)
            .map(|close| self.source.trailing_comment(close + 1, self.in_flow()))
            .unwrap_or_default();
        node.with_trailing_comment(comment)
    }

    fn end_sequence(&self, start: usize, flow: bool, items: Vec<Node>) -> Node {
        if flow {
            return self.flow_comment(Node::sequence(items, self.source.position(start)), start);
        }
        let dash = self.source.dash_before(start).unwrap_or(start);
        Node::sequence(items, self.source.position(dash))
    }

    fn end_mapping(&self, start: usize, flow: bool, entries: Vec<(Node, Node)>) -> Node {
        if flow {
            return self.flow_comment(Node::mapping(entries, self.source.position(start)), start);
        }
        let position = entries
            .first()
            .map(|(key, _)| key.position())
            .unwrap_or_else(|| self.source.position(start));
        Node::mapping(entries, position)
    }
}

impl MarkedEventReceiver for TreeBuilder {
    fn on_event(&mut self, ev: Event, marker: Marker) {
        if self.error.is_some() {
            return;
        }
        trace!("yaml event {:?} at index {}", ev, marker.index());

        match ev {
            Event::Scalar(value, _style, anchor, _tag) => {
                let node = self.scalar(value, &marker);
                self.complete(node, anchor);
            }

            Event::SequenceStart(anchor, _tag) => {
                let start = marker.index();
                let flow = self.begin_collection(start);
                self.stack.push(Pending::Sequence {
                    start,
                    flow,
                    anchor,
                    items: Vec::new(),
                });
            }

            Event::MappingStart(anchor, _tag) => {
                let start = marker.index();
                let flow = self.begin_collection(start);
                self.stack.push(Pending::Mapping {
                    start,
                    flow,
                    anchor,
                    entries: Vec::new(),
                });
            }

            Event::SequenceEnd | Event::MappingEnd => match self.stack.pop() {
                Some(Pending::Sequence {
                    start,
                    flow,
                    anchor,
                    items,
                }) => {
                    let node = self.end_sequence(start, flow, items);
                    self.complete(node, anchor);
                }
                Some(Pending::Mapping {
                    start,
                    flow,
                    anchor,
                    entries,
                }) => {
                    let entries = entries
                        .into_iter()
                        .filter_map(|(key, value)| value.map(|value| (key, value)))
                        .collect();
                    let node = self.end_mapping(start, flow, entries);
                    self.complete(node, anchor);
                }
                None => {
                    self.error = Some(ParseError::Syntax(
                        "collection end without a matching start".to_string(),
                    ));
                }
            },

            Event::Alias(anchor) => match self.anchors.get(&anchor).cloned() {
                Some(node) => self.complete(node, 0),
                None => self.error = Some(ParseError::UnknownAnchor),
            },

            _ => {}
        }
    }
}

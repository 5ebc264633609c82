//! go-patch style path pointers
//!
//! A pointer addresses a value inside a YAML document with a `/`-separated
//! list of steps, in the manner of RFC 6901 JSON pointers extended with
//! go-patch's matching and optional steps:
//!
//! - `/key`: a map key
//! - `/0`, `/-1`: an array index, negative indexes counting from the end
//! - `/name=value`: the array item that is a map with `name: value`
//! - `/-`: the slot after the last array item (only meaningful for writes)
//! - `/key?`: makes this step and every step after it optional
//! - `/0:next`, `/name=value:prev`: index modifiers (`prev`, `next`,
//!   `before`, `after`)
//!
//! `~1` and `~0` escape `/` and `~` inside keys and values.

use std::fmt;
use thiserror::Error;

/// Errors produced while tokenizing a pointer string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PointerError {
    #[error("Expected to start with '/'")]
    MissingLeadingSlash,

    #[error(
        "Expected to find one of the following modifiers: 'prev', 'next', 'before', or 'after' but found '{0}'"
    )]
    UnknownModifier(String),

    #[error("Expected not to find any modifiers with after last index token")]
    ModifiersOnAfterLastIndex,

    #[error("Expected not to find any modifiers with key token")]
    ModifiersOnKey,
}

/// Adjusts an index step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Prev,
    Next,
    Before,
    After,
}

impl Modifier {
    fn parse(raw: &str) -> Result<Self, PointerError> {
        match raw {
            "prev" => Ok(Self::Prev),
            "next" => Ok(Self::Next),
            "before" => Ok(Self::Before),
            "after" => Ok(Self::After),
            other => Err(PointerError::UnknownModifier(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prev => "prev",
            Self::Next => "next",
            Self::Before => "before",
            Self::After => "after",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of a pointer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    /// The implicit first step, standing for the document root
    Root,
    Index {
        index: i64,
        modifiers: Vec<Modifier>,
    },
    AfterLastIndex,
    MatchingIndex {
        key: String,
        value: String,
        optional: bool,
        modifiers: Vec<Modifier>,
    },
    Key {
        key: String,
        optional: bool,
    },
}

impl Token {
    pub fn key(key: impl Into<String>) -> Self {
        Self::Key {
            key: key.into(),
            optional: false,
        }
    }

    pub fn optional_key(key: impl Into<String>) -> Self {
        Self::Key {
            key: key.into(),
            optional: true,
        }
    }

    pub fn index(index: i64) -> Self {
        Self::Index {
            index,
            modifiers: Vec::new(),
        }
    }

    pub fn matching(key: impl Into<String>, value: impl Into<String>, optional: bool) -> Self {
        Self::MatchingIndex {
            key: key.into(),
            value: value.into(),
            optional,
            modifiers: Vec::new(),
        }
    }

    /// Human readable name of the token kind, used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Root => "root token",
            Self::Index { .. } => "index token",
            Self::AfterLastIndex => "after last index token",
            Self::MatchingIndex { .. } => "matching index token",
            Self::Key { .. } => "key token",
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(
            self,
            Self::Key { optional: true, .. } | Self::MatchingIndex { optional: true, .. }
        )
    }

    fn write_modifiers(f: &mut fmt::Formatter<'_>, modifiers: &[Modifier]) -> fmt::Result {
        for modifier in modifiers {
            write!(f, ":{}", modifier)?;
        }
        Ok(())
    }

    /// Render the token; `mark_optional` controls whether a `?` is printed
    fn render(&self, f: &mut fmt::Formatter<'_>, mark_optional: bool) -> fmt::Result {
        let question = if mark_optional && self.is_optional() {
            "?"
        } else {
            ""
        };
        match self {
            Self::Root => Ok(()),
            Self::Index { index, modifiers } => {
                write!(f, "{}", index)?;
                Self::write_modifiers(f, modifiers)
            }
            Self::AfterLastIndex => write!(f, "-"),
            Self::MatchingIndex {
                key,
                value,
                modifiers,
                ..
            } => {
                write!(f, "{}={}{}", escape(key), escape(value), question)?;
                Self::write_modifiers(f, modifiers)
            }
            Self::Key { key, .. } => write!(f, "{}{}", escape(key), question),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, true)
    }
}

/// A tokenized path, always starting with [`Token::Root`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pointer {
    tokens: Vec<Token>,
}

impl Pointer {
    /// The pointer addressing the document root
    pub fn root() -> Self {
        Self {
            tokens: vec![Token::Root],
        }
    }

    /// Build a pointer from the steps following the root
    pub fn from_steps(steps: impl IntoIterator<Item = Token>) -> Self {
        let mut tokens = vec![Token::Root];
        tokens.extend(steps);
        Self { tokens }
    }

    /// Tokenize a textual pointer
    pub fn parse(input: &str) -> Result<Self, PointerError> {
        if input.is_empty() {
            return Ok(Self::root());
        }

        let rest = input
            .strip_prefix('/')
            .ok_or(PointerError::MissingLeadingSlash)?;

        let pieces: Vec<&str> = rest.split('/').collect();
        let mut tokens = vec![Token::Root];
        let mut optional = false;

        for (i, piece) in pieces.iter().enumerate() {
            let is_last = i == pieces.len() - 1;

            let mut parts = piece.split(':');
            let raw = parts.next().unwrap_or_default();
            let modifiers = parts.map(Modifier::parse).collect::<Result<Vec<_>, _>>()?;

            let unescaped = unescape(raw);

            if is_last && unescaped == "-" {
                if !modifiers.is_empty() {
                    return Err(PointerError::ModifiersOnAfterLastIndex);
                }
                tokens.push(Token::AfterLastIndex);
                continue;
            }

            if let Ok(index) = unescaped.parse::<i64>() {
                tokens.push(Token::Index { index, modifiers });
                continue;
            }

            if unescaped.ends_with('?') {
                optional = true;
            }

            if let Some((key, value)) = unescaped.split_once('=') {
                tokens.push(Token::MatchingIndex {
                    key: key.to_string(),
                    value: value.strip_suffix('?').unwrap_or(value).to_string(),
                    optional,
                    modifiers,
                });
                continue;
            }

            if !modifiers.is_empty() {
                return Err(PointerError::ModifiersOnKey);
            }

            tokens.push(Token::Key {
                key: unescaped
                    .strip_suffix('?')
                    .unwrap_or(&unescaped)
                    .to_string(),
                optional,
            });
        }

        Ok(Self { tokens })
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Number of tokens, root marker included
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always false: a pointer holds at least the root marker
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// True when the pointer addresses the document root
    pub fn is_root(&self) -> bool {
        self.tokens.len() <= 1
    }

    /// The sub-pointer made of the first `len` tokens
    pub fn prefix(&self, len: usize) -> Self {
        let len = len.clamp(1, self.tokens.len().max(1));
        Self {
            tokens: self.tokens[..len].to_vec(),
        }
    }
}

impl Default for Pointer {
    fn default() -> Self {
        Self::root()
    }
}

impl std::str::FromStr for Pointer {
    type Err = PointerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Optionality is sticky, so only the first optional step shows its `?`.
        let mut seen_optional = false;
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            let mark = !seen_optional;
            token.render(f, mark)?;
            seen_optional |= token.is_optional();
        }
        Ok(())
    }
}

fn unescape(raw: &str) -> String {
    raw.replace("~1", "/").replace("~0", "~")
}

fn escape(raw: &str) -> String {
    raw.replace('~', "~0").replace('/', "~1")
}

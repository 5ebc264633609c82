//! Resolving a pointer against a document tree
//!
//! [`resolve`] walks a [`Pointer`] one token at a time, starting from the
//! document root. Each token is checked against the kind of the node under
//! the cursor:
//!
//! - index tokens descend into a sequence item
//! - matching-index tokens descend into the single sequence item that is a
//!   mapping holding the requested `key: value` pair
//! - key tokens descend into a mapping value
//! - after-last-index tokens are rejected, a read has no slot past the end
//!
//! Optional tokens that find nothing do not fail. An optional key missing
//! at the end of the path resolves to `None`. Anywhere else the resolver
//! continues through a detached placeholder node carrying the sentinel
//! position, so the rest of the path can still be checked.

use crate::core::keys::present_keys;
use crate::core::node::{IndexError, Node, NodeKind};
use crate::core::pointer::{Modifier, Pointer, Token};
use log::{debug, trace};
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Why a token cannot be followed during a read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedReason {
    /// The token only makes sense when writing
    ReadTraversal,
    /// No placeholder container can stand in for an absent optional key
    /// when this token comes next
    NoPlaceholder,
    /// A root marker somewhere other than the start of the path
    MisplacedRoot,
}

impl fmt::Display for UnsupportedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadTraversal => write!(f, "not supported in find operations"),
            Self::NoPlaceholder => write!(
                f,
                "expected a key or matching index token after an absent optional key"
            ),
            Self::MisplacedRoot => write!(f, "a root token can only start a path"),
        }
    }
}

/// Errors raised while resolving a pointer
///
/// Every variant carries the sub-path consumed up to and including the
/// token that failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Expected to find an array at path '{path}' but found {found}")]
    TypeMismatch { path: Pointer, found: NodeKind },

    #[error("Expected to find a map key '{key}' for path '{path}' ({})", describe_keys(.present))]
    MissingKey {
        key: String,
        path: Pointer,
        present: BTreeSet<String>,
    },

    #[error(
        "Expected to find exactly one matching array item for path '{path}' but found {}",
        .positions.len()
    )]
    AmbiguousMatch { path: Pointer, positions: Vec<usize> },

    #[error("Expected to find exactly one matching array item for path '{path}' but found 0")]
    NoMatch { path: Pointer },

    #[error("Expected not to find {} '{token}' at path '{path}' ({reason})", .token.kind_name())]
    UnsupportedToken {
        path: Pointer,
        token: Token,
        reason: UnsupportedReason,
    },

    #[error(
        "Expected to find array index '{index}' but found array of length '{len}' for path '{path}'"
    )]
    IndexOutOfRange {
        path: Pointer,
        index: i64,
        len: usize,
    },

    #[error(
        "Expected to find one of the following modifiers: 'prev', 'next', but found modifier '{modifier}' for path '{path}'"
    )]
    UnsupportedModifier { path: Pointer, modifier: Modifier },
}

impl ResolveError {
    /// The sub-path consumed when the error was raised
    pub fn path(&self) -> &Pointer {
        match self {
            Self::TypeMismatch { path, .. }
            | Self::MissingKey { path, .. }
            | Self::AmbiguousMatch { path, .. }
            | Self::NoMatch { path }
            | Self::UnsupportedToken { path, .. }
            | Self::IndexOutOfRange { path, .. }
            | Self::UnsupportedModifier { path, .. } => path,
        }
    }
}

fn describe_keys(keys: &BTreeSet<String>) -> String {
    if keys.is_empty() {
        return "found no other map keys".to_string();
    }
    let quoted: Vec<String> = keys.iter().map(|key| format!("'{}'", key)).collect();
    format!("found map keys: {}", quoted.join(", "))
}

/// Resolve `pointer` against the document rooted at `root`
///
/// Returns the addressed node, borrowed from the tree when it exists in the
/// source and owned when it is a placeholder. `Ok(None)` means an optional
/// key at the end of the path is absent.
pub fn resolve<'a>(
    root: &'a Node,
    pointer: &Pointer,
) -> Result<Option<Cow<'a, Node>>, ResolveError> {
    let tokens = pointer.tokens();
    let mut cursor = Cow::Borrowed(root);

    for (idx, token) in tokens.iter().enumerate().skip(1) {
        let is_last = idx == tokens.len() - 1;
        let path = || pointer.prefix(idx + 1);
        trace!("resolving {} '{}' against {}", token.kind_name(), token, cursor.kind());

        cursor = match token {
            Token::Index { index, modifiers } => {
                expect_sequence(&cursor, path)?;
                let position = concrete_index(&cursor, *index, modifiers, path)?;
                descend(cursor, position)
            }

            Token::AfterLastIndex => {
                return Err(ResolveError::UnsupportedToken {
                    path: path(),
                    token: token.clone(),
                    reason: UnsupportedReason::ReadTraversal,
                });
            }

            Token::MatchingIndex {
                key,
                value,
                optional,
                modifiers,
            } => {
                expect_sequence(&cursor, path)?;
                let positions: Vec<usize> = cursor
                    .children()
                    .iter()
                    .enumerate()
                    .filter(|(_, item)| item.is_mapping() && item.has_scalar_entry(key, value))
                    .map(|(position, _)| position)
                    .collect();

                if positions.is_empty() {
                    if !*optional {
                        return Err(ResolveError::NoMatch { path: path() });
                    }
                    debug!("no item matches {}={} at '{}', using a placeholder", key, value, path());
                    Cow::Owned(Node::synthetic_entry(key, value))
                } else if positions.len() > 1 {
                    return Err(ResolveError::AmbiguousMatch {
                        path: path(),
                        positions,
                    });
                } else {
                    let position = concrete_index(&cursor, positions[0] as i64, modifiers, path)?;
                    descend(cursor, position)
                }
            }

            Token::Key { key, optional } => match cursor.value_position_of(key) {
                Some(position) => descend(cursor, position),
                None if !*optional || !cursor.is_mapping() => {
                    return Err(ResolveError::MissingKey {
                        key: key.clone(),
                        path: path(),
                        present: present_keys(&cursor),
                    });
                }
                None if is_last => return Ok(None),
                None => {
                    let next = &tokens[idx + 1];
                    debug!("optional key '{}' is absent at '{}', using a placeholder", key, path());
                    placeholder_before(next).ok_or_else(|| ResolveError::UnsupportedToken {
                        path: pointer.prefix(idx + 2),
                        token: next.clone(),
                        reason: match next {
                            Token::Root => UnsupportedReason::MisplacedRoot,
                            _ => UnsupportedReason::NoPlaceholder,
                        },
                    })?
                }
            },

            Token::Root => {
                return Err(ResolveError::UnsupportedToken {
                    path: path(),
                    token: token.clone(),
                    reason: UnsupportedReason::MisplacedRoot,
                });
            }
        };
    }

    Ok(Some(cursor))
}

fn expect_sequence(node: &Node, path: impl Fn() -> Pointer) -> Result<(), ResolveError> {
    if node.is_sequence() {
        Ok(())
    } else {
        Err(ResolveError::TypeMismatch {
            path: path(),
            found: node.kind(),
        })
    }
}

fn concrete_index(
    sequence: &Node,
    index: i64,
    modifiers: &[Modifier],
    path: impl Fn() -> Pointer,
) -> Result<usize, ResolveError> {
    sequence
        .concrete_index(index, modifiers)
        .map_err(|err| match err {
            IndexError::OutOfRange { index, len } => ResolveError::IndexOutOfRange {
                path: path(),
                index,
                len,
            },
            IndexError::UnsupportedModifier(modifier) => ResolveError::UnsupportedModifier {
                path: path(),
                modifier,
            },
        })
}

/// Empty container standing in for an absent optional key, shaped for `next`
fn placeholder_before<'a>(next: &Token) -> Option<Cow<'a, Node>> {
    match next {
        Token::Key { .. } => Some(Cow::Owned(Node::synthetic_mapping())),
        Token::MatchingIndex { .. } => Some(Cow::Owned(Node::synthetic_sequence())),
        Token::Index { .. } | Token::AfterLastIndex | Token::Root => None,
    }
}

/// Move the cursor to child `position`, which must exist
fn descend(cursor: Cow<'_, Node>, position: usize) -> Cow<'_, Node> {
    match cursor {
        Cow::Borrowed(node) => Cow::Borrowed(&node.children()[position]),
        Cow::Owned(node) => Cow::Owned(node.into_children().swap_remove(position)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::parser::parse_document;
    use pretty_assertions::assert_eq;

    fn doc(yaml: &str) -> Node {
        parse_document(yaml).unwrap()
    }

    fn ptr(path: &str) -> Pointer {
        Pointer::parse(path).unwrap()
    }

    fn located(root: &Node, path: &str) -> (i64, i64) {
        let node = resolve(root, &ptr(path)).unwrap().unwrap();
        (node.line(), node.column())
    }

    const RELEASE: &str = "\
name: demo
instance_groups:
- name: web
  instances: 2
  jobs:
  - name: nginx
    release: nginx
- name: worker
  instances: 1
";

    #[test]
    fn test_root_pointer_returns_root() {
        let root = doc(RELEASE);
        let resolved = resolve(&root, &Pointer::root()).unwrap().unwrap();
        assert!(matches!(resolved, Cow::Borrowed(_)));
        assert_eq!(&*resolved, &root);

        let scalar = doc("just text");
        let resolved = resolve(&scalar, &Pointer::root()).unwrap().unwrap();
        assert_eq!(resolved.scalar_value(), Some("just text"));
    }

    #[test]
    fn test_key_lookup() {
        let root = doc(RELEASE);
        assert_eq!(located(&root, "/name"), (1, 7));
        assert_eq!(located(&root, "/instance_groups"), (3, 1));
    }

    #[test]
    fn test_collection_lookup() {
        let root = doc(RELEASE);
        assert_eq!(located(&root, ""), (1, 1));
        assert_eq!(located(&root, "/instance_groups/name=web"), (3, 3));
        assert_eq!(located(&root, "/instance_groups/1"), (8, 3));
        assert_eq!(located(&root, "/instance_groups/0/jobs"), (6, 3));
        assert_eq!(located(&root, "/instance_groups/0/jobs/name=nginx"), (6, 5));

        let indentless = doc("jobs:\n- name: a\n- name: b\n");
        assert_eq!(located(&indentless, "/jobs"), (2, 1));
        assert_eq!(located(&indentless, "/jobs/name=b"), (3, 3));
    }

    #[test]
    fn test_index_lookup() {
        let root = doc(RELEASE);
        assert_eq!(located(&root, "/instance_groups/0/instances"), (4, 14));
        assert_eq!(located(&root, "/instance_groups/1/name"), (8, 9));
        assert_eq!(located(&root, "/instance_groups/-1/instances"), (9, 14));
        assert_eq!(located(&root, "/instance_groups/0:next/name"), (8, 9));
    }

    #[test]
    fn test_matching_index_lookup() {
        let root = doc(RELEASE);
        assert_eq!(located(&root, "/instance_groups/name=worker/instances"), (9, 14));
        assert_eq!(
            located(&root, "/instance_groups/name=web/jobs/name=nginx/release"),
            (7, 14)
        );
        assert_eq!(located(&root, "/instance_groups/name=web:next/name"), (8, 9));
    }

    #[test]
    fn test_missing_key_lists_present_keys() {
        let root = doc("a: 1\nb: 2\n");
        let err = resolve(&root, &ptr("/c")).unwrap_err();
        let expected: BTreeSet<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        assert_eq!(
            err,
            ResolveError::MissingKey {
                key: "c".to_string(),
                path: ptr("/c"),
                present: expected,
            }
        );
        assert_eq!(
            err.to_string(),
            "Expected to find a map key 'c' for path '/c' (found map keys: 'a', 'b')"
        );
    }

    #[test]
    fn test_missing_key_in_empty_mapping() {
        let root = doc("a: {}\n");
        let err = resolve(&root, &ptr("/a/b")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected to find a map key 'b' for path '/a/b' (found no other map keys)"
        );
    }

    #[test]
    fn test_key_on_non_mapping() {
        let root = doc("items: [a, b]\n");
        let err = resolve(&root, &ptr("/items/a")).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::MissingKey { ref present, .. } if present.is_empty()
        ));

        // Optionality does not excuse the wrong node kind.
        let err = resolve(&root, &ptr("/items/a?")).unwrap_err();
        assert!(matches!(err, ResolveError::MissingKey { .. }));
    }

    #[test]
    fn test_index_on_non_sequence() {
        let root = doc(RELEASE);
        let err = resolve(&root, &ptr("/name/0")).unwrap_err();
        assert_eq!(
            err,
            ResolveError::TypeMismatch {
                path: ptr("/name/0"),
                found: NodeKind::Scalar,
            }
        );
        assert_eq!(
            err.to_string(),
            "Expected to find an array at path '/name/0' but found a scalar"
        );

        let err = resolve(&root, &ptr("/name=x")).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::TypeMismatch { found: NodeKind::Mapping, .. }
        ));
    }

    #[test]
    fn test_index_out_of_range() {
        let root = doc("items: [a, b]\n");
        let err = resolve(&root, &ptr("/items/5")).unwrap_err();
        assert_eq!(
            err,
            ResolveError::IndexOutOfRange {
                path: ptr("/items/5"),
                index: 5,
                len: 2,
            }
        );
        assert_eq!(
            err.to_string(),
            "Expected to find array index '5' but found array of length '2' for path '/items/5'"
        );
        assert!(matches!(
            resolve(&root, &ptr("/items/-3")).unwrap_err(),
            ResolveError::IndexOutOfRange { index: -3, .. }
        ));
    }

    #[test]
    fn test_insertion_modifier_rejected() {
        let root = doc("items: [a, b]\n");
        let err = resolve(&root, &ptr("/items/0:before")).unwrap_err();
        assert_eq!(
            err,
            ResolveError::UnsupportedModifier {
                path: ptr("/items/0:before"),
                modifier: Modifier::Before,
            }
        );
    }

    #[test]
    fn test_ambiguous_match_reports_item_positions() {
        let root = doc("- name: x\n- other: 1\n- name: x\n");
        let err = resolve(&root, &ptr("/name=x")).unwrap_err();
        assert_eq!(
            err,
            ResolveError::AmbiguousMatch {
                path: ptr("/name=x"),
                positions: vec![0, 2],
            }
        );
        assert_eq!(
            err.to_string(),
            "Expected to find exactly one matching array item for path '/name=x' but found 2"
        );
    }

    #[test]
    fn test_no_match() {
        let root = doc("- name: y\n");
        let err = resolve(&root, &ptr("/name=x")).unwrap_err();
        assert_eq!(err, ResolveError::NoMatch { path: ptr("/name=x") });
    }

    #[test]
    fn test_matching_skips_non_mapping_items() {
        let root = doc("- name\n- [name, x]\n- name: x\n");
        let node = resolve(&root, &ptr("/name=x")).unwrap().unwrap();
        assert_eq!(node.line(), 3);
        assert!(node.is_mapping());
    }

    #[test]
    fn test_optional_no_match_synthesizes_entry() {
        let root = doc("- name: y\n");
        let node = resolve(&root, &ptr("/name=x?")).unwrap().unwrap();
        assert!(matches!(node, Cow::Owned(_)));
        assert_eq!((node.line(), node.column()), (-1, -1));
        assert_eq!(&*node, &Node::synthetic_entry("name", "x"));
    }

    #[test]
    fn test_continue_through_synthesized_entry() {
        let root = doc("- name: y\n");
        let node = resolve(&root, &ptr("/name=x?/name")).unwrap().unwrap();
        assert_eq!(node.scalar_value(), Some("x"));
        assert!(node.is_synthetic());

        // Keys beyond the synthesized pair are absent, which is fine when optional.
        assert_eq!(resolve(&root, &ptr("/name=x?/other")).unwrap(), None);

        let err = resolve(&root, &ptr("/name=x?/0")).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::TypeMismatch { found: NodeKind::Mapping, .. }
        ));
    }

    #[test]
    fn test_optional_key_absent_at_end() {
        let root = doc("a: 1\n");
        assert_eq!(resolve(&root, &ptr("/b?")).unwrap(), None);
    }

    #[test]
    fn test_optional_key_absent_then_key() {
        let root = doc("a: 1\n");
        // Optionality is sticky, so the trailing key is also optional.
        assert_eq!(resolve(&root, &ptr("/b?/c")).unwrap(), None);
        assert_eq!(resolve(&root, &ptr("/b?/c/d")).unwrap(), None);
    }

    #[test]
    fn test_optional_key_absent_then_matching_index() {
        let root = doc("a: 1\n");
        let node = resolve(&root, &ptr("/jobs?/name=x")).unwrap().unwrap();
        assert!(node.is_synthetic());
        assert!(node.has_scalar_entry("name", "x"));
    }

    #[test]
    fn test_optional_key_absent_then_index() {
        let root = doc("a: 1\n");
        let err = resolve(&root, &ptr("/jobs?/0/name")).unwrap_err();
        assert_eq!(
            err,
            ResolveError::UnsupportedToken {
                path: ptr("/jobs?/0"),
                token: Token::index(0),
                reason: UnsupportedReason::NoPlaceholder,
            }
        );
    }

    #[test]
    fn test_optional_key_absent_then_misplaced_root() {
        let root = doc("a: 1\n");
        let pointer = Pointer::from_steps([Token::optional_key("b"), Token::Root]);
        let err = resolve(&root, &pointer).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::UnsupportedToken {
                reason: UnsupportedReason::MisplacedRoot,
                ..
            }
        ));
    }

    #[test]
    fn test_after_last_index_is_unsupported() {
        let root = doc(RELEASE);
        for path in ["/-", "/instance_groups/-", "/instance_groups/0/jobs/-"] {
            let err = resolve(&root, &ptr(path)).unwrap_err();
            assert!(
                matches!(
                    err,
                    ResolveError::UnsupportedToken {
                        token: Token::AfterLastIndex,
                        reason: UnsupportedReason::ReadTraversal,
                        ..
                    }
                ),
                "{}",
                path
            );
        }

        let err = resolve(&root, &ptr("/instance_groups/-")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected not to find after last index token '-' at path '/instance_groups/-' (not supported in find operations)"
        );
    }

    #[test]
    fn test_error_carries_consumed_sub_path() {
        let root = doc(RELEASE);
        let err = resolve(&root, &ptr("/instance_groups/name=web/missing/deeper")).unwrap_err();
        assert_eq!(err.path().to_string(), "/instance_groups/name=web/missing");
    }

    #[test]
    fn test_real_nodes_never_synthetic() {
        let root = doc(RELEASE);
        for path in [
            "/name",
            "/instance_groups/0",
            "/instance_groups/name=web/jobs/0/name",
            "/instance_groups/name=worker?/instances",
        ] {
            let node = resolve(&root, &ptr(path)).unwrap().unwrap();
            assert!(matches!(node, Cow::Borrowed(_)), "{}", path);
            assert!(!node.is_synthetic(), "{}", path);
        }
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let root = doc(RELEASE);
        let snapshot = root.clone();
        let pointer = ptr("/instance_groups/name=web/jobs/name=nginx/release");

        let first = resolve(&root, &pointer).map(|n| n.map(Cow::into_owned));
        let second = resolve(&root, &pointer).map(|n| n.map(Cow::into_owned));
        assert_eq!(first, second);
        assert_eq!(root, snapshot);
    }
}

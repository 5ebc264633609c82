//! Core library types for locating values in YAML documents
//!
//! This module contains the domain logic, independent of any file or text
//! handling:
//! - Node: a document tree node with its source position
//! - Pointer: a tokenized go-patch style path
//! - resolve: the traversal from a document root to the addressed node
//! - present_keys: the keys of a mapping, used to explain missing keys

pub mod keys;
pub mod node;
pub mod pointer;
pub mod resolver;

pub use keys::present_keys;
pub use node::{IndexError, Node, NodeKind, Position};
pub use pointer::{Modifier, Pointer, PointerError, Token};
pub use resolver::{resolve, ResolveError, UnsupportedReason};

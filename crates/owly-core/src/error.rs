//! Core error types for owly-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering the
//! failure modes of the arenas and type registry in this crate. Parser,
//! semantic, and lowering errors live in their own crates.

use thiserror::Error;

use crate::id::{ExprId, NodeId};
use crate::type_id::TypeId;

/// Errors produced by owly-core's arenas and type registry.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Attempting to register a type name that already exists in the registry.
    #[error("duplicate type name: '{name}'")]
    DuplicateTypeName { name: String },

    /// A `TypeId` was not found in the type registry.
    #[error("type not found: {id}")]
    TypeNotFound { id: TypeId },

    /// A `NodeId` was not found in the AST arena.
    #[error("AST node not found: {id}")]
    NodeNotFound { id: NodeId },

    /// An `ExprId` was not found in the expression arena.
    #[error("expression not found: {id}")]
    ExprNotFound { id: ExprId },

    /// A persisted token record did not match the `TAG, "lexeme";` grammar.
    #[error("malformed token record at line {line}: {text}")]
    MalformedTokenRecord { line: usize, text: String },
}

//! Diagnostics accumulated across the three passes (§7 "Error handling
//! design", SPEC_FULL.md §10.1/§10.2).
//!
//! Unlike `owly-parser`, the analyzer never aborts on the first problem:
//! errors and warnings are recorded on [`crate::context::SemanticContext`]
//! and analysis continues at the next sibling node, so one run surfaces as
//! many diagnostics as possible.

use owly_core::{ExprId, NodeId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

/// Kinds of hard semantic errors (§7's "Symbol-table" / "Type-resolution" /
/// "Semantic" / "Lowering diagnostics" taxonomy, minus the parser's own
/// syntactic kinds which live in `owly-parser::error::ParseError`).
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SemaError {
    #[error("redefinition of '{name}' in this scope")]
    DuplicateDeclaration { name: String },
    #[error("unknown type name '{name}'")]
    UnknownTypeName { name: String },
    #[error("'{name}' does not name a type")]
    NotATypeName { name: String },
    #[error("incomplete type used where a complete type is required")]
    IncompleteType,
    #[error("invalid declaration inside struct/union")]
    InvalidMemberDeclaration,
    #[error("use of undeclared identifier '{name}'")]
    UndefinedIdentifier { name: String },
    #[error("variable '{name}' not found in current scope")]
    VariableNotFound { name: String },
    #[error("expression is not assignable")]
    NotAnLvalue,
    #[error("address-of requires an addressable operand")]
    NotAddressable,
    #[error("indirection requires a pointer operand")]
    NotAPointer,
    #[error("increment/decrement requires an assignable operand")]
    NotAssignableForIncDec,
    #[error("'{name}' expects {expected} argument(s), got {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("call to undefined function '{name}'")]
    UndefinedFunction { name: String },
    #[error("incompatible types in {context}")]
    IncompatibleTypes { context: String },
    #[error("invalid cast between incompatible types")]
    InvalidCast,
    #[error("array index must have integral type")]
    NonIntegralIndex,
    #[error("indexed expression does not have array type")]
    NotAnArray,
    #[error("no member named '{member}'")]
    UnknownMember { member: String },
    #[error("member access requires a struct or union operand")]
    NotAStructOrUnion,
    #[error("empty set literal")]
    EmptySetLiteral,
    #[error("too many elements in array initializer")]
    TooManyInitializers,
    #[error("array initializer must be a set expression")]
    InitializerNotASet,
    #[error("non-void function must return a value")]
    MissingReturnValue,
    #[error("'break'/'continue' outside of a loop")]
    BreakContinueOutsideLoop,
    #[error("internal error: {0}")]
    Internal(String),
}

/// Kinds of non-fatal diagnostics. Narrowing conversions are warnings, not
/// errors (§7).
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SemaWarning {
    #[error(
        "implicit narrowing conversion in initialization of variable '{name}' (from {from} to {to})"
    )]
    NarrowingInitializer {
        name: String,
        from: String,
        to: String,
    },
    #[error("implicit narrowing conversion in assignment (from {from} to {to})")]
    NarrowingAssignment { from: String, to: String },
    #[error("implicit narrowing conversion passing argument {index} to '{name}' (from {from} to {to})")]
    NarrowingArgument {
        name: String,
        index: usize,
        from: String,
        to: String,
    },
}

/// One recorded diagnostic, carrying enough context (node/expr) for a
/// caller to point a renderer back at the offending syntax.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub node: Option<NodeId>,
    pub expr: Option<ExprId>,
}

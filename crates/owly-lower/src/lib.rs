//! IR lowering for Owly (§4.5 "Lowering"): walks an already-analyzed AST
//! and emits an [`owly_ir::IRModule`].
//!
//! Lowering never re-derives what semantic analysis already decided — it
//! reads `Node::resolved_type` / `Expr::inferred_type` and
//! [`owly_sema::SemanticContext`]'s type registry, and refuses to run at
//! all if [`owly_sema::SemanticContext::has_errors`] is true.

mod cast;
mod common;
mod context;
mod error;
mod expr;
mod program;
mod stmt;

pub use cast::determine_cast_op;
pub use error::LowerError;
pub use program::lower_program;

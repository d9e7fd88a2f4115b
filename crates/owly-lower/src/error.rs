//! Lowering diagnostics (§7 "Lowering diagnostics", SPEC_FULL.md §10.1).

use thiserror::Error;

/// Errors `owly-lower` itself can raise. Everything else -- symbol lookup,
/// type resolution -- is assumed already validated by `owly-sema`; lowering
/// a program with outstanding semantic errors is refused up front rather
/// than risked against half-annotated nodes.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LowerError {
    #[error("'break' outside of a loop")]
    BreakOutsideLoop,
    #[error("'continue' outside of a loop")]
    ContinueOutsideLoop,
    #[error("cannot lower a program with outstanding semantic errors ({error_count} error(s))")]
    UnresolvedSemanticErrors { error_count: u32 },
    #[error("internal error: {0}")]
    Internal(String),
}

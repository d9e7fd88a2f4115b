//! Parser errors.
//!
//! One error aborts parsing outright -- there is no error-recovery/resync
//! pass (§4.1: "the parser stops at the first syntactic error"). Library
//! code signals this with `Result`/`?` so a caller (the CLI) decides how to
//! report and exit, rather than parsing continuing past the error.

use owly_core::TokenKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("expected {expected}, found {found} ('{lexeme}')")]
    UnexpectedToken {
        expected: String,
        found: TokenKind,
        lexeme: String,
    },

    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },

    #[error("invalid type specifier combination: {reason}")]
    InvalidSpecifier { reason: String },

    #[error("'{name}' cannot be used as a type name")]
    NotATypeName { name: String },
}

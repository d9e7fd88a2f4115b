//! Recursive-descent parser for Owly (§4.1).
//!
//! Consumes a [`owly_core::TokenStream`] and produces an [`owly_core::Ast`]
//! plus [`owly_core::ExprPool`]. The tokenizer itself is an external
//! collaborator (§6); this crate never constructs tokens, only consumes
//! them.

mod expr;
mod parser;
mod stmt;
mod types;

pub mod error;

pub use error::ParseError;
pub use parser::Parser;

use owly_core::{Ast, ExprPool, Token};

/// Parses a complete token list into a program. Convenience wrapper around
/// [`Parser::new`] + [`Parser::parse_program`] for callers that don't need
/// to drive the parser incrementally.
pub fn parse(tokens: Vec<Token>) -> Result<(Ast, ExprPool), ParseError> {
    Parser::new(tokens).parse_program()
}
